pub mod ast;
pub mod go;

use crate::error::ParseError;
use crate::types::context::SourceFile;
use ast::{FileId, ParsedFile};

/// Generic entry point: parse a `SourceFile` into a `ParsedFile`.
///
/// Unlike the raw tree-sitter parse, this rejects files whose tree contains
/// syntax errors: a rewrite is only ever attempted on valid input.
pub fn parse_source_file(file_id: FileId, sf: &SourceFile) -> Result<ParsedFile, ParseError> {
    let parsed = go::parse_go_file(file_id, sf).map_err(|source| ParseError::File {
        file_path: sf.path.clone(),
        source,
    })?;

    if let Some((line, column)) = go::first_syntax_error(&parsed) {
        return Err(ParseError::Syntax {
            file_path: sf.path.clone(),
            line,
            column,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source_file(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parse_go_file_success() {
        let sf = make_source_file("test.go", "package main\n\nfunc main() {}\n");
        let parsed = parse_source_file(FileId(5), &sf).unwrap();
        assert_eq!(parsed.file_id, FileId(5));
        assert_eq!(parsed.path, "test.go");
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let sf = make_source_file("bad.go", "package main\n\nfunc main() {\n\tx := \n");
        let err = parse_source_file(FileId(9), &sf).unwrap_err();
        match err {
            ParseError::Syntax { file_path, .. } => assert_eq!(file_path, "bad.go"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_unicode_content() {
        let code = "package main\n\n// 日本語コメント\nvar message = \"こんにちは世界\"\n";
        let sf = make_source_file("unicode.go", code);
        let parsed = parse_source_file(FileId(10), &sf).unwrap();
        assert!(parsed.source.contains("日本語"));
    }
}
