use thiserror::Error;

/// Errors that occur while parsing individual files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {file_path}: {source}")]
    File {
        file_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("syntax error in {file_path} at {line}:{column}")]
    Syntax {
        file_path: String,
        line: u32,
        column: u32,
    },
}
