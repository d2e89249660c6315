//! # CLI Command Implementations
//!
//! - [`strip`] - Remove `log` statements and the `log` import from Go sources

pub mod strip;
