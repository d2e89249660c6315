//! # Exit Codes
//!
//! Exit codes for the logdel CLI, following common Unix conventions so
//! scripts and CI jobs can tell failures apart.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// One or more files could not be rewritten
pub const EXIT_ERROR: i32 = 1;

/// Settings file missing, unreadable or invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Invalid input (bad arguments, missing paths)
pub const EXIT_INVALID_INPUT: i32 = 6;
