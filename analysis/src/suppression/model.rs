//! Per-file suppression index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Comments of one file keyed by source line, plus the file-wide flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionIndex {
    marker: String,
    /// `"{path}_{line}"` -> raw comment text; the last comment on a line wins.
    line_map: BTreeMap<String, String>,
    /// True iff any comment of the file contains the marker.
    file_flag: bool,
}

impl SuppressionIndex {
    pub(crate) fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            ..Self::default()
        }
    }

    /// Key of the entry for `line` (1-based) of `path`.
    pub fn key(path: &str, line: u32) -> String {
        format!("{path}_{line}")
    }

    pub(crate) fn insert(&mut self, path: &str, line: u32, text: &str) {
        if text.contains(&self.marker) {
            self.file_flag = true;
        }
        self.line_map.insert(Self::key(path, line), text.to_string());
    }

    /// Comment text recorded for a line, if any.
    pub fn entry(&self, path: &str, line: u32) -> Option<&str> {
        self.line_map.get(&Self::key(path, line)).map(String::as_str)
    }

    /// Whether the comment on `line` carries the marker.
    pub fn is_line_suppressed(&self, path: &str, line: u32) -> bool {
        self.entry(path, line)
            .is_some_and(|text| text.contains(&self.marker))
    }

    pub fn file_flag(&self) -> bool {
        self.file_flag
    }

    pub fn len(&self) -> usize {
        self.line_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_map.is_empty()
    }
}
