use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// Engine-internal identifier for a file in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u64);

/// Text range in (line, col) space; 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// Lightweight handle to "where in the AST" something lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstLocation {
    pub file_id: FileId,
    pub range: TextRange,
}

impl AstLocation {
    /// 1-based line of the start position, as shown to users.
    pub fn line(&self) -> u32 {
        self.range.start_line + 1
    }

    /// 1-based column of the start position, as shown to users.
    pub fn column(&self) -> u32 {
        self.range.start_col + 1
    }
}

/// A fully parsed Go source file: source + tree-sitter AST.
#[derive(Debug)]
pub struct ParsedFile {
    pub file_id: FileId,
    pub path: String,
    pub source: Arc<String>,
    pub tree: Tree,
}

impl ParsedFile {
    /// Convert a tree-sitter node range into a TextRange.
    pub fn location_for_node(&self, node: &Node) -> AstLocation {
        let range = node.range();
        let start = range.start_point;
        let end = range.end_point;

        AstLocation {
            file_id: self.file_id,
            range: TextRange {
                start_line: start.row as u32,
                start_col: start.column as u32,
                end_line: end.row as u32,
                end_col: end.column as u32,
            },
        }
    }

    /// Get the exact source text for a node.
    pub fn text_for_node(&self, node: &Node) -> String {
        self.str_for_node(node).to_string()
    }

    /// Borrow the source text of a node without allocating.
    pub fn str_for_node(&self, node: &Node) -> &str {
        let byte_range = node.byte_range();
        &self.source[byte_range.start..byte_range.end]
    }

    /// 1-based line on which a node starts.
    pub fn line_of(&self, node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }
}
