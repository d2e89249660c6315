//! # Workspace Scanning
//!
//! Finds the Go source files under a directory and groups them by the
//! directory they live in. A directory may still hold more than one
//! package (`foo` and `foo_test`); the analyzer splits those by package
//! clause.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use log::debug;

/// Go source files under a root, grouped by directory.
#[derive(Debug, Default)]
pub struct GoWorkspace {
    pub root: PathBuf,
    pub directories: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl GoWorkspace {
    /// Walk `root` for `*.go` files.
    ///
    /// Honours `.gitignore`, `.ignore` and git excludes, with or without a
    /// `.git` directory, and skips hidden, `vendor`, `testdata` and
    /// underscore-prefixed directories the way the Go tool does.
    pub fn scan(root: &Path) -> Self {
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .require_git(false)
            .add_custom_ignore_filename(".gitignore")
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                match entry.file_name().to_str() {
                    Some(name) if is_dir => !Self::should_skip_directory(name),
                    _ => true,
                }
            })
            .build();

        let mut directories: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !is_go_source(path) {
                continue;
            }
            let dir = path.parent().unwrap_or(root).to_path_buf();
            directories.entry(dir).or_default().push(path.to_path_buf());
        }
        for files in directories.values_mut() {
            files.sort();
        }

        debug!(
            "found {} Go file(s) in {} director(ies) under {}",
            directories.values().map(Vec::len).sum::<usize>(),
            directories.len(),
            root.display()
        );

        Self {
            root: root.to_path_buf(),
            directories,
        }
    }

    pub fn file_count(&self) -> usize {
        self.directories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    fn should_skip_directory(name: &str) -> bool {
        // hidden directories are handled by the walker's hidden()
        name == "vendor" || name == "testdata" || name.starts_with('_')
    }
}

fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}
