//! Opt-out markers in comments.
//!
//! A comment containing the marker (`nocheck:thislog` by default) has two
//! independent effects:
//!
//! ```text
//! log.Println("kept") // nocheck:thislog
//! ```
//!
//! - **Line**: the statement starting on the comment's line is never removed
//! - **File**: the logging import of the file is kept (see `ImportPolicy`)

mod model;
mod parser;

pub use model::SuppressionIndex;
pub use parser::parse_suppressions;
