use std::path::PathBuf;

use logdel_core::error::ParseError;
use thiserror::Error;

/// Errors that abort the rewrite of a single file.
///
/// None of these leave a partially written file behind: every variant is
/// raised before the atomic rename, or by the rename itself.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("parsing error: {0}")]
    Parse(#[from] ParseError),

    /// The rewritten text no longer parses.
    #[error("rewrite of {file_path} produced invalid Go at {line}:{column}")]
    Malformed {
        file_path: String,
        line: u32,
        column: u32,
    },

    #[error("failed to emit {file_path}: {reason}")]
    Emit { file_path: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RewriteError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("configuration error: {0}")]
    Value(String),
}
