//! One Go package as the unit of analysis, and what running over it reports.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use logdel_core::parse::ast::FileId;
use logdel_core::parse::parse_source_file;
use logdel_core::semantics::go::{ImportGraph, PackageCatalog, PackageFile, TypeInfo};
use logdel_core::types::context::SourceFile;
use logdel_core::types::patch::make_unified_diff;
use serde::Serialize;

use crate::error::RewriteError;
use crate::visitor::{DeletionKind, SuppressedCall, VisitOutcome};

/// The parsed files of one package together with its resolution results.
///
/// `imports` and `type_info` are computed once and shared read-only by the
/// rewrites of every file.
#[derive(Debug)]
pub struct Pass {
    pub package_name: String,
    pub files: Vec<PackageFile>,
    pub imports: ImportGraph,
    pub type_info: TypeInfo,
}

impl Pass {
    pub fn new(files: Vec<PackageFile>, catalog: &PackageCatalog) -> Self {
        let package_name = files
            .first()
            .map(|f| f.semantics.package_name.clone())
            .unwrap_or_default();
        let imports = ImportGraph::from_files(files.iter().map(|f| &f.semantics), catalog);
        let type_info = TypeInfo::check(&files, &imports);
        Self {
            package_name,
            files,
            imports,
            type_info,
        }
    }

    /// Parse `sources` and group them by package clause, one pass per
    /// package. Files that fail to parse are returned separately.
    pub fn from_sources(sources: Vec<SourceFile>, catalog: &PackageCatalog) -> (Vec<Self>, Vec<FileFailure>) {
        let mut packages: BTreeMap<String, Vec<PackageFile>> = BTreeMap::new();
        let mut failures = Vec::new();
        for (index, source) in sources.into_iter().enumerate() {
            match parse_source_file(FileId(index as u64 + 1), &source) {
                Ok(parsed) => {
                    let file = PackageFile::new(parsed);
                    packages
                        .entry(file.semantics.package_name.clone())
                        .or_default()
                        .push(file);
                }
                Err(err) => failures.push(FileFailure::new(&source.path, err.into())),
            }
        }
        let passes = packages
            .into_values()
            .map(|files| Self::new(files, catalog))
            .collect();
        (passes, failures)
    }

    /// Read and parse the files at `paths`, which should share a directory.
    pub fn load<P: AsRef<Path>>(paths: &[P], catalog: &PackageCatalog) -> (Vec<Self>, Vec<FileFailure>) {
        let mut sources = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(content) => sources.push(SourceFile {
                    path: path.to_string_lossy().to_string(),
                    content,
                }),
                Err(err) => failures.push(FileFailure::new(
                    &path.to_string_lossy(),
                    RewriteError::io(path, err),
                )),
            }
        }
        let (passes, parse_failures) = Self::from_sources(sources, catalog);
        failures.extend(parse_failures);
        (passes, failures)
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    /// The rewrite differs from the original.
    pub changed: bool,
    /// The rewrite was committed to disk.
    pub written: bool,
    pub removed_statements: usize,
    pub removed_import: bool,
    pub import_retained: bool,
    pub suppressed: Vec<SuppressedCall>,
    pub skipped: usize,
    #[serde(skip)]
    pub original: Arc<String>,
    #[serde(skip)]
    pub rewritten: String,
}

impl FileReport {
    pub fn new(path: &str, original: Arc<String>, rewritten: String, outcome: VisitOutcome, written: bool) -> Self {
        let removed_import = outcome.deletions.iter().any(|d| {
            matches!(d.kind, DeletionKind::Import | DeletionKind::ImportDeclaration)
        });
        Self {
            path: path.to_string(),
            changed: *original != rewritten,
            written,
            removed_statements: outcome.removed_statements(),
            removed_import,
            import_retained: outcome.import_retained,
            suppressed: outcome.suppressed,
            skipped: outcome.skipped,
            original,
            rewritten,
        }
    }

    /// Unified diff of the rewrite; empty when nothing changed.
    pub fn diff(&self) -> String {
        if !self.changed {
            return String::new();
        }
        make_unified_diff(&self.path, &self.original, &self.rewritten)
    }
}

/// A file that could not be rewritten.
#[derive(Debug)]
pub struct FileFailure {
    pub path: String,
    pub error: RewriteError,
}

impl FileFailure {
    pub fn new(path: &str, error: RewriteError) -> Self {
        Self {
            path: path.to_string(),
            error,
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Per-file results of running over one package.
#[derive(Debug, Default)]
pub struct PassReport {
    pub package: String,
    pub results: Vec<Result<FileReport, FileFailure>>,
}

impl PassReport {
    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}
