use std::sync::Arc;

use anyhow::Result;
use tree_sitter::{Language as TsLanguage, Node, Parser};

use crate::parse::ast::{FileId, ParsedFile};
use crate::types::context::SourceFile;

fn go_language() -> TsLanguage {
    tree_sitter_go::LANGUAGE.into()
}

/// Parse a Go source file into a `ParsedFile`.
///
/// tree-sitter is error tolerant: a file with syntax errors still yields a
/// tree. Use [`first_syntax_error`] to reject such trees.
pub fn parse_go_file(file_id: FileId, sf: &SourceFile) -> Result<ParsedFile> {
    let mut parser = Parser::new();
    parser.set_language(&go_language())?;

    let source = Arc::new(sf.content.clone());
    let tree = parser
        .parse(&*source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse Go source"))?;

    Ok(ParsedFile {
        file_id,
        path: sf.path.clone(),
        source,
        tree,
    })
}

/// Find the first ERROR or MISSING node in the tree, pre-order.
///
/// Returns its 1-based (line, column).
pub fn first_syntax_error(parsed: &ParsedFile) -> Option<(u32, u32)> {
    let root = parsed.tree.root_node();
    if !root.has_error() {
        return None;
    }
    find_error(root).map(|node| {
        let pos = node.start_position();
        (pos.row as u32 + 1, pos.column as u32 + 1)
    })
}

fn find_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_error(child) {
            return Some(found);
        }
    }
    // has_error() but no ERROR/MISSING descendant found: report the node itself
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_go_source_file(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_go_language_returns_valid_language() {
        let lang = go_language();
        assert!(lang.abi_version() > 0);
    }

    #[test]
    fn test_parse_simple_package() {
        let sf = make_go_source_file("test.go", "package main");
        let parsed = parse_go_file(FileId(1), &sf).unwrap();
        assert_eq!(parsed.tree.root_node().kind(), "source_file");
        assert!(first_syntax_error(&parsed).is_none());
    }

    #[test]
    fn test_parse_logging_program() {
        let code = r#"
package main

import (
    "fmt"
    lg "log"
)

func main() {
    fmt.Println("Hello, World!")
    lg.Println("x")
}
"#;
        let sf = make_go_source_file("main.go", code);
        let parsed = parse_go_file(FileId(2), &sf).unwrap();
        let root = parsed.tree.root_node();
        assert_eq!(root.kind(), "source_file");
        assert!(!root.has_error());
    }

    #[test]
    fn test_parse_syntax_error_tolerant() {
        let code = "package main\nfunc broken(\n";
        let sf = make_go_source_file("broken.go", code);
        let parsed = parse_go_file(FileId(13), &sf).unwrap();
        assert!(parsed.tree.root_node().has_error());
        let (line, _col) = first_syntax_error(&parsed).unwrap();
        assert!(line >= 2);
    }

    #[test]
    fn test_source_content_preserved() {
        let code = "package main\n\nvar x = 42\n";
        let sf = make_go_source_file("content.go", code);
        let parsed = parse_go_file(FileId(14), &sf).unwrap();
        assert_eq!(parsed.source.as_str(), code);
        assert_eq!(parsed.file_id, FileId(14));
        assert_eq!(parsed.path, "content.go");
    }

    #[test]
    fn test_parse_generics() {
        let code = r#"
package main

func Map[T, U any](items []T, f func(T) U) []U {
    result := make([]U, len(items))
    for i, item := range items {
        result[i] = f(item)
    }
    return result
}
"#;
        let sf = make_go_source_file("generics.go", code);
        let parsed = parse_go_file(FileId(17), &sf).unwrap();
        assert!(first_syntax_error(&parsed).is_none());
    }
}
