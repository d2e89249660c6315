//! # logdel
//!
//! Command-line front end: settings discovery, workspace scanning and the
//! strip command. The rewriting itself lives in `logdel_analysis`.

pub mod commands;
pub mod errors;
pub mod exit_codes;
pub mod settings;
pub mod workspace;
