//! Rendering a file with its deletions applied.
//!
//! Deletions become patch hunks on the original text. A statement alone on
//! its line takes the whole line with it, including the newline; a
//! statement sharing its line loses only its own text plus the `;`
//! separator and adjacent blanks. A line that only whitespace survives on
//! is removed too. Removing lines never leaves two blank lines where there
//! was one. The result is re-parsed before it is handed back, then run
//! through `gofmt` when it is configured and installed.

use std::collections::BTreeSet;
use std::io::Write;
use std::process::{Command, Stdio};

use log::warn;
use logdel_core::parse::ast::ParsedFile;
use logdel_core::parse::go::{first_syntax_error, parse_go_file};
use logdel_core::types::context::SourceFile;
use logdel_core::types::patch::{apply_file_patch, FilePatch, PatchHunk};

use crate::config::Formatter;
use crate::error::RewriteError;
use crate::visitor::Deletion;

const GOFMT: &str = "gofmt";

/// Render `parsed` without the `deletions`.
pub fn emit(parsed: &ParsedFile, deletions: &[Deletion], formatter: Formatter) -> Result<String, RewriteError> {
    if deletions.is_empty() {
        return Ok(parsed.source.to_string());
    }

    let patch = build_patch(parsed, deletions);
    let text = apply_file_patch(&parsed.source, &patch);
    verify(parsed, &text)?;

    match formatter {
        Formatter::Builtin => Ok(text),
        Formatter::Gofmt => match run_formatter(GOFMT, &parsed.path, &text)? {
            Some(formatted) => Ok(formatted),
            None => {
                warn!("{}: gofmt not found on PATH, keeping builtin output", parsed.path);
                Ok(text)
            }
        },
    }
}

/// Patch hunks that remove `deletions` from the file.
pub fn build_patch(parsed: &ParsedFile, deletions: &[Deletion]) -> FilePatch {
    let source = parsed.source.as_str();
    let spans = line_spans(source);
    let mut removed_lines = BTreeSet::new();
    let mut hunks = Vec::new();
    let mut cut = Vec::new();

    for deletion in deletions {
        let start = deletion.start_byte.min(source.len());
        let end = extend_over_separator(source, deletion.end_byte.min(source.len()));
        let (Some(first), Some(last)) = (
            line_index(&spans, start),
            line_index(&spans, end.saturating_sub(1).max(start)),
        ) else {
            continue;
        };

        let prefix = &source[spans[first].0..start];
        let suffix = &source[end..spans[last].1];

        if prefix.trim().is_empty() && suffix.trim().is_empty() {
            removed_lines.extend(first..=last);
        } else if prefix.trim().is_empty() {
            let blanks = suffix.len() - suffix.trim_start_matches([' ', '\t']).len();
            cut.push((start, end + blanks));
        } else {
            let blanks = prefix.len() - prefix.trim_end_matches([' ', '\t']).len();
            cut.push((start - blanks, end));
        }
    }

    // Overlapping byte hunks and line hunks are merged when applied.
    cut.sort_unstable();
    removed_lines.extend(emptied_lines(source, &spans, &cut, &removed_lines));
    hunks.extend(cut.iter().map(|&(start, end)| PatchHunk::delete_bytes(start, end)));

    collapse_blank_lines(source, &spans, &mut removed_lines);
    for (first, last) in runs(&removed_lines) {
        // PatchRange lines are 1-based
        hunks.push(PatchHunk::delete_lines(first as u32 + 1, last as u32 + 1));
    }

    FilePatch {
        file_id: parsed.file_id,
        hunks,
    }
}

/// `(start, end)` byte span of every line, the newline included.
fn line_spans(source: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        spans.push((offset, offset + line.len()));
        offset += line.len();
    }
    spans
}

fn line_index(spans: &[(usize, usize)], byte: usize) -> Option<usize> {
    let idx = spans.partition_point(|&(start, _)| start <= byte);
    idx.checked_sub(1)
}

/// Move `end` past blanks and a `;` that follow it, if there is one.
fn extend_over_separator(source: &str, end: usize) -> usize {
    let rest = &source[end..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    if trimmed.starts_with(';') {
        end + (rest.len() - trimmed.len()) + 1
    } else {
        end
    }
}

/// Lines left holding only whitespace once the `cut` byte ranges are gone.
///
/// A cut that swallows a newline joins its line with the next, so the
/// lines of such a join are judged together.
fn emptied_lines(
    source: &str,
    spans: &[(usize, usize)],
    cut: &[(usize, usize)],
    removed: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    let mut emptied = BTreeSet::new();
    let mut joined_from = None;
    let mut touched = false;
    let mut blank = true;

    for (idx, &(start, end)) in spans.iter().enumerate() {
        if removed.contains(&idx) {
            continue;
        }
        let first = *joined_from.get_or_insert(idx);
        let content_end = if source[start..end].ends_with('\n') { end - 1 } else { end };

        let mut pos = start;
        for &(cut_start, cut_end) in cut.iter().filter(|&&(s, e)| s < end && e > start) {
            touched = true;
            if cut_start > pos {
                blank &= source[pos..cut_start].trim().is_empty();
            }
            pos = pos.max(cut_end);
        }
        if pos < content_end {
            blank &= source[pos..content_end].trim().is_empty();
        }

        let newline_survives = content_end < end && pos <= content_end;
        if newline_survives || idx + 1 == spans.len() {
            if touched && blank {
                emptied.extend(first..=idx);
            }
            joined_from = None;
            touched = false;
            blank = true;
        }
    }
    emptied
}

fn is_blank(source: &str, span: (usize, usize)) -> bool {
    source[span.0..span.1].trim().is_empty()
}

/// Drop the blank line after a removed run that sat between two blank lines.
fn collapse_blank_lines(source: &str, spans: &[(usize, usize)], removed: &mut BTreeSet<usize>) {
    let mut extra = Vec::new();
    for (first, last) in runs(removed) {
        let Some(prev) = first.checked_sub(1) else {
            continue;
        };
        let next = last + 1;
        if next >= spans.len() || removed.contains(&prev) {
            continue;
        }
        if is_blank(source, spans[prev]) && is_blank(source, spans[next]) {
            extra.push(next);
        }
    }
    removed.extend(extra);
}

/// Maximal runs of consecutive line indices.
fn runs(lines: &BTreeSet<usize>) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &line in lines {
        match out.last_mut() {
            Some((_, last)) if *last + 1 == line => *last = line,
            _ => out.push((line, line)),
        }
    }
    out
}

fn verify(parsed: &ParsedFile, text: &str) -> Result<(), RewriteError> {
    let sf = SourceFile {
        path: parsed.path.clone(),
        content: text.to_string(),
    };
    let reparsed = parse_go_file(parsed.file_id, &sf).map_err(|err| RewriteError::Emit {
        file_path: parsed.path.clone(),
        reason: err.to_string(),
    })?;
    match first_syntax_error(&reparsed) {
        Some((line, column)) => Err(RewriteError::Malformed {
            file_path: parsed.path.clone(),
            line,
            column,
        }),
        None => Ok(()),
    }
}

/// Pipe `text` through `program`, a gofmt-compatible formatter.
///
/// Returns `Ok(None)` when `program` is not installed.
fn run_formatter(program: &str, path: &str, text: &str) -> Result<Option<String>, RewriteError> {
    let emit_error = |reason: String| RewriteError::Emit {
        file_path: path.to_string(),
        reason,
    };

    let spawned = Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(emit_error(format!("failed to run {program}: {err}"))),
    };

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|err| emit_error(format!("failed to write to {program}: {err}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|err| emit_error(format!("{program} did not finish: {err}")))?;
    if !output.status.success() {
        return Err(emit_error(String::from_utf8_lossy(&output.stderr).trim().to_string()));
    }

    String::from_utf8(output.stdout)
        .map(Some)
        .map_err(|err| emit_error(format!("{program} produced invalid UTF-8: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::DeletionKind;
    use logdel_core::parse::ast::FileId;

    fn parse(source: &str) -> ParsedFile {
        let sf = SourceFile {
            path: "main.go".to_string(),
            content: source.to_string(),
        };
        parse_go_file(FileId(1), &sf).unwrap()
    }

    fn delete(source: &str, needle: &str, kind: DeletionKind) -> Deletion {
        let start = source.find(needle).unwrap();
        Deletion {
            kind,
            start_byte: start,
            end_byte: start + needle.len(),
            line: source[..start].matches('\n').count() as u32 + 1,
            text: needle.to_string(),
        }
    }

    fn emit_builtin(source: &str, needles: &[(&str, DeletionKind)]) -> String {
        let parsed = parse(source);
        let deletions: Vec<Deletion> = needles
            .iter()
            .map(|(needle, kind)| delete(source, needle, *kind))
            .collect();
        emit(&parsed, &deletions, Formatter::Builtin).unwrap()
    }

    #[test]
    fn no_deletions_returns_source_verbatim() {
        let src = "package main\n\nfunc main() {}\n";
        let parsed = parse(src);
        assert_eq!(emit(&parsed, &[], Formatter::Gofmt).unwrap(), src);
    }

    #[test]
    fn removes_statement_line_and_import_with_its_blank_line() {
        let src = r#"package main

import "log"

func main() {
	log.Println("hello")
}
"#;
        let out = emit_builtin(
            src,
            &[
                ("import \"log\"", DeletionKind::ImportDeclaration),
                ("log.Println(\"hello\")", DeletionKind::Statement),
            ],
        );
        assert_eq!(out, "package main\n\nfunc main() {\n}\n");
    }

    #[test]
    fn removes_spec_line_from_group() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\t\"log\"\n)\n\nfunc main() {\n\tfmt.Println()\n}\n";
        let out = emit_builtin(src, &[("\"log\"", DeletionKind::Import)]);
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\n\tfmt.Println()\n}\n"
        );
    }

    #[test]
    fn statement_sharing_a_line_takes_its_separator() {
        let src = "package main\n\nfunc main() {\n\ta(); log.Println(\"x\"); b()\n}\n";
        let out = emit_builtin(src, &[("log.Println(\"x\")", DeletionKind::Statement)]);
        assert_eq!(out, "package main\n\nfunc main() {\n\ta(); b()\n}\n");
    }

    #[test]
    fn line_emptied_by_shared_deletions_is_removed() {
        let src = "package main\n\nfunc main() {\n\ta()\n\tlog.Println(1); log.Println(2)\n}\n";
        let out = emit_builtin(
            src,
            &[
                ("log.Println(1)", DeletionKind::Statement),
                ("log.Println(2)", DeletionKind::Statement),
            ],
        );
        assert_eq!(out, "package main\n\nfunc main() {\n\ta()\n}\n");
        assert!(!out.lines().any(|line| !line.is_empty() && line.trim().is_empty()));
    }

    #[test]
    fn emptied_line_between_blanks_collapses() {
        let src = "package main\n\nfunc main() {\n\ta()\n\n\tlog.Println(1); log.Println(2)\n\n\tb()\n}\n";
        let out = emit_builtin(
            src,
            &[
                ("log.Println(1)", DeletionKind::Statement),
                ("log.Println(2)", DeletionKind::Statement),
            ],
        );
        assert_eq!(out, "package main\n\nfunc main() {\n\ta()\n\n\tb()\n}\n");
    }

    #[test]
    fn leading_statement_keeps_trailing_comment() {
        let src = "package main\n\nfunc main() {\n\tlog.Println(\"x\") // why\n\ta()\n}\n";
        let out = emit_builtin(src, &[("log.Println(\"x\")", DeletionKind::Statement)]);
        assert_eq!(out, "package main\n\nfunc main() {\n\t// why\n\ta()\n}\n");
    }

    #[test]
    fn multi_line_statement_is_removed_entirely() {
        let src = "package main\n\nfunc main() {\n\tlog.Printf(\"%d %d\",\n\t\t1,\n\t\t2)\n\ta()\n}\n";
        let out = emit_builtin(
            src,
            &[("log.Printf(\"%d %d\",\n\t\t1,\n\t\t2)", DeletionKind::Statement)],
        );
        assert_eq!(out, "package main\n\nfunc main() {\n\ta()\n}\n");
    }

    #[test]
    fn adjacent_removed_lines_between_blanks_collapse() {
        let src = "package main\n\nfunc main() {\n\ta()\n\n\tlog.Println(1)\n\tlog.Println(2)\n\n\tb()\n}\n";
        let out = emit_builtin(
            src,
            &[
                ("log.Println(1)", DeletionKind::Statement),
                ("log.Println(2)", DeletionKind::Statement),
            ],
        );
        assert_eq!(out, "package main\n\nfunc main() {\n\ta()\n\n\tb()\n}\n");
    }

    #[test]
    fn malformed_result_is_rejected() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n}\n";
        let parsed = parse(src);
        let deletions = vec![delete(src, "{", DeletionKind::Statement)];
        let err = emit(&parsed, &deletions, Formatter::Builtin).unwrap_err();
        assert!(matches!(err, RewriteError::Malformed { .. }));
    }

    #[test]
    fn build_patch_uses_line_hunks_for_whole_lines() {
        let src = "package main\n\nfunc main() {\n\tlog.Println(1)\n}\n";
        let parsed = parse(src);
        let patch = build_patch(&parsed, &[delete(src, "log.Println(1)", DeletionKind::Statement)]);
        assert_eq!(patch.hunks.len(), 1);
        assert_eq!(
            patch.hunks[0].range,
            logdel_core::types::patch::PatchRange::RemoveLines { first: 4, last: 4 }
        );
    }

    #[test]
    fn missing_formatter_is_not_an_error() {
        let formatted = run_formatter("logdel-no-such-formatter", "main.go", "package main\n").unwrap();
        assert_eq!(formatted, None);
    }

    #[test]
    fn gofmt_realigns_comments_left_behind() {
        let src = "package main\n\nimport \"log\"\n\nfunc main() {\n\tx := 1           // a\n\tlog.Println(x)\n\t_ = x\n}\n";
        if run_formatter(GOFMT, "main.go", "package main\n").unwrap_or(None).is_none() {
            // gofmt not installed
            return;
        }
        let parsed = parse(src);
        let deletions = vec![
            delete(src, "import \"log\"", DeletionKind::ImportDeclaration),
            delete(src, "log.Println(x)", DeletionKind::Statement),
        ];
        let out = emit(&parsed, &deletions, Formatter::Gofmt).unwrap();
        assert!(out.contains("\tx := 1 // a\n"));
        assert!(!out.contains("log"));
    }

    #[test]
    fn gofmt_mode_agrees_with_builtin_on_canonical_output() {
        let src = "package main\n\nimport \"log\"\n\nfunc main() {\n\tlog.Println(1)\n}\n";
        let parsed = parse(src);
        let deletions = vec![
            delete(src, "import \"log\"", DeletionKind::ImportDeclaration),
            delete(src, "log.Println(1)", DeletionKind::Statement),
        ];
        // Either gofmt reformats canonical text to itself or the builtin text is kept.
        let out = emit(&parsed, &deletions, Formatter::Gofmt).unwrap();
        assert_eq!(out, emit(&parsed, &deletions, Formatter::Builtin).unwrap());
    }

    #[test]
    fn line_helpers() {
        let spans = line_spans("ab\ncd\n");
        assert_eq!(spans, vec![(0, 3), (3, 6)]);
        assert_eq!(line_index(&spans, 4), Some(1));
        assert_eq!(extend_over_separator("x ; y", 1), 3);
        assert_eq!(extend_over_separator("x y", 1), 1);
        let lines: BTreeSet<usize> = [1, 2, 5].into_iter().collect();
        assert_eq!(runs(&lines), vec![(1, 2), (5, 5)]);
    }
}
