use serde::{Deserialize, Serialize};

/// A Go source file handed to the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}
