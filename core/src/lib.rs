//! # logdel-core
//!
//! Go parsing, import extraction and identifier resolution for logdel.
//!
//! - **Parsing**: tree-sitter based parsing of Go source files
//! - **Semantics**: package clause, imports, comments and a lexical resolver
//!   that tells package members apart from locals that shadow them
//! - **Types**: source files and byte-range patches
//!
//! ## Example
//!
//! ```rust,ignore
//! use logdel_core::parse::parse_source_file;
//! use logdel_core::semantics::{ImportGraph, PackageCatalog, PackageFile, TypeInfo};
//! use logdel_core::types::context::SourceFile;
//! use logdel_core::parse::ast::FileId;
//!
//! let source = SourceFile {
//!     path: "main.go".to_string(),
//!     content: "package main\n\nimport \"log\"\n".to_string(),
//! };
//!
//! let files = vec![PackageFile::new(parse_source_file(FileId(1), &source)?)];
//! let graph = ImportGraph::from_files(files.iter().map(|f| &f.semantics), &PackageCatalog::standard());
//! let info = TypeInfo::check(&files, &graph);
//! ```

pub mod error;
pub mod parse;
pub mod semantics;
pub mod types;

pub use parse::ast::{FileId, ParsedFile};
pub use types::context::SourceFile;
