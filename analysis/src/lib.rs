//! logdel-analysis: detection and removal of Go `log` statements
//!
//! The pipeline for one file:
//! - build the suppression index from the file's comments
//! - resolve the facility's entry points against the package's imports
//! - walk the tree and decide which imports and statements to delete
//! - splice the deletions out and re-parse the result
//! - atomically replace the file
//!
//! # Example
//!
//! ```ignore
//! use logdel_analysis::{Analyzer, WriteMode};
//!
//! let analyzer = Analyzer::with_default_config();
//! let report = analyzer.run_file(Path::new("main.go"), WriteMode::InPlace)?;
//! println!("removed {} statement(s)", report.removed_statements);
//! ```

pub mod config;
pub mod emit;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod pass;
pub mod replace;
pub mod resolve;
pub mod suppression;
pub mod visitor;

// Re-export main engine types
pub use config::{EngineConfig, Formatter, ImportPolicy, LogFacility, MatchMode};
pub use engine::{rewrite_source, Analyzer, Rewrite, WriteMode};
pub use error::{ConfigError, RewriteError};
pub use pass::{FileFailure, FileReport, Pass, PassReport};
pub use resolve::TargetSymbolSet;
pub use suppression::SuppressionIndex;
pub use visitor::{Deletion, DeletionKind, VisitOutcome};
