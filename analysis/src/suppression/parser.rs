//! Building the suppression index from a file's comments.

use logdel_core::semantics::go::model::GoComment;

use crate::suppression::model::SuppressionIndex;

/// Index every comment of `path` by the line of its first character.
///
/// Never fails: a file without comments yields an empty index whose file
/// flag is false.
///
/// # Example
/// ```ignore
/// let sem = GoFileSemantics::from_parsed(&parsed);
/// let index = parse_suppressions(&sem.path, &sem.comments, "nocheck:thislog");
/// assert!(index.is_line_suppressed(&sem.path, 7));
/// ```
pub fn parse_suppressions(path: &str, comments: &[GoComment], marker: &str) -> SuppressionIndex {
    let mut index = SuppressionIndex::new(marker);
    for comment in comments {
        index.insert(path, comment.line, &comment.text);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdel_core::parse::ast::FileId;
    use logdel_core::parse::go::parse_go_file;
    use logdel_core::semantics::go::model::GoFileSemantics;
    use logdel_core::types::context::SourceFile;

    fn index_for(source: &str) -> SuppressionIndex {
        let sf = SourceFile {
            path: "main.go".to_string(),
            content: source.to_string(),
        };
        let parsed = parse_go_file(FileId(1), &sf).unwrap();
        let sem = GoFileSemantics::from_parsed(&parsed);
        parse_suppressions(&sem.path, &sem.comments, "nocheck:thislog")
    }

    #[test]
    fn no_comments_yields_empty_index() {
        let index = index_for("package main\n\nfunc main() {}\n");
        assert!(index.is_empty());
        assert!(!index.file_flag());
    }

    #[test]
    fn inline_marker_suppresses_its_line() {
        let src = r#"package main

import "log"

func main() {
	log.Println("a") // nocheck:thislog
	log.Println("b")
}
"#;
        let index = index_for(src);
        assert!(index.is_line_suppressed("main.go", 6));
        assert!(!index.is_line_suppressed("main.go", 7));
        assert!(index.file_flag());
    }

    #[test]
    fn marker_on_its_own_line_only_sets_the_flag() {
        let src = "package main\n\n// nocheck:thislog\nfunc main() {\n\tprintln()\n}\n";
        let index = index_for(src);
        assert!(index.file_flag());
        assert!(index.is_line_suppressed("main.go", 3));
        assert!(!index.is_line_suppressed("main.go", 5));
    }

    #[test]
    fn block_comment_is_keyed_by_first_line() {
        let src = "package main\n\n/*\n nocheck:thislog\n*/\nfunc main() {}\n";
        let index = index_for(src);
        assert!(index.is_line_suppressed("main.go", 3));
        assert!(!index.is_line_suppressed("main.go", 4));
    }

    #[test]
    fn ordinary_comments_do_not_set_the_flag() {
        let src = "package main\n\n// Package main does things.\nfunc main() {} // done\n";
        let index = index_for(src);
        assert_eq!(index.len(), 2);
        assert!(!index.file_flag());
    }

    #[test]
    fn custom_marker() {
        let sf = SourceFile {
            path: "x.go".to_string(),
            content: "package x // keep:log\n".to_string(),
        };
        let parsed = parse_go_file(FileId(2), &sf).unwrap();
        let sem = GoFileSemantics::from_parsed(&parsed);
        let index = parse_suppressions("x.go", &sem.comments, "keep:log");
        assert!(index.file_flag());
        assert!(index.is_line_suppressed("x.go", 1));
    }
}
