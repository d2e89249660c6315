// src/types/patch.rs
use serde::{Deserialize, Serialize};

use crate::parse::ast::FileId;
use similar::TextDiff;

/// A patch that applies multiple edits (hunks) to a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePatch {
    pub file_id: FileId,
    pub hunks: Vec<PatchHunk>,
}

/// A single edit operation inside a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchHunk {
    pub range: PatchRange,
    pub replacement: String,
}

impl PatchHunk {
    /// A hunk that deletes the byte range [start, end).
    pub fn delete_bytes(start: usize, end: usize) -> Self {
        Self {
            range: PatchRange::ReplaceBytes { start, end },
            replacement: String::new(),
        }
    }

    /// A hunk that deletes whole lines `first..=last` (1-based), newlines included.
    pub fn delete_lines(first: u32, last: u32) -> Self {
        Self {
            range: PatchRange::RemoveLines { first, last },
            replacement: String::new(),
        }
    }
}

/// Different ways to specify where a hunk applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchRange {
    /// Replace the byte range [start, end) with `replacement`.
    ReplaceBytes { start: usize, end: usize },

    /// Replace the 1-based lines `first..=last`, including the final newline.
    RemoveLines { first: u32, last: u32 },
}

/// Byte offset at which every line starts; line 1 -> offset 0.
///
/// A virtual "line after last" is appended so that ranges ending on the
/// final line resolve to the end of the text.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(idx + 1);
        }
    }
    starts.push(text.len());
    starts
}

/// Apply a `FilePatch` to an in-memory file contents and return the new contents.
///
/// This works in byte offsets (not chars) and:
/// - converts line-based ranges to byte offsets,
/// - merges overlapping ranges so no byte is edited twice,
/// - applies hunks from right to left so earlier ranges don't shift later ones.
pub fn apply_file_patch(original: &str, patch: &FilePatch) -> String {
    let mut text = original.to_string();
    let starts = line_starts(original);

    // Normalize all hunks to (start, end, replacement) in byte offsets.
    let mut normalized: Vec<(usize, usize, String)> = Vec::new();

    for h in &patch.hunks {
        match &h.range {
            PatchRange::ReplaceBytes { start, end } => {
                let s = (*start).min(text.len());
                let e = (*end).min(text.len());
                if s <= e {
                    normalized.push((s, e, h.replacement.clone()));
                }
            }

            PatchRange::RemoveLines { first, last } => {
                if *first == 0 || first > last {
                    continue;
                }
                let s = *starts
                    .get(*first as usize - 1)
                    .unwrap_or(&text.len());
                let e = *starts.get(*last as usize).unwrap_or(&text.len());
                normalized.push((s, e, h.replacement.clone()));
            }
        }
    }

    normalized.sort_by_key(|(start, _end, _)| *start);

    // Fold overlapping hunks into the earlier one.
    let mut merged: Vec<(usize, usize, String)> = Vec::with_capacity(normalized.len());
    for (start, end, repl) in normalized {
        match merged.last_mut() {
            Some((_, prev_end, prev_repl)) if start < *prev_end => {
                if end > *prev_end {
                    *prev_end = end;
                }
                prev_repl.push_str(&repl);
            }
            _ => merged.push((start, end, repl)),
        }
    }

    for (start, end, repl) in merged.into_iter().rev() {
        text.replace_range(start..end, &repl);
    }

    text
}

/// Build a unified diff string between `before` and `after` using `similar` 2.7.
pub fn make_unified_diff(path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(path, path)
        .to_string()
}
