//! # Workspace Settings
//!
//! Settings come from one of two places:
//!
//! - an explicit file given with `--config`
//! - `.logdel.toml` in the target directory or the nearest parent that has one
//!
//! Only one source is used per run (no merging). Command-line flags are
//! applied on top by the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use logdel_analysis::{ConfigError, EngineConfig};

/// Name of the standalone settings file.
pub const SETTINGS_FILE: &str = ".logdel.toml";

/// Where settings were loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// Given with `--config`.
    Explicit,
    /// Found by walking up from the target.
    Discovered,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::Explicit => write!(f, "--config"),
            SettingsSource::Discovered => write!(f, "{}", SETTINGS_FILE),
        }
    }
}

/// Result of loading workspace settings.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub config: EngineConfig,
    pub source: SettingsSource,
    /// Path to the settings file.
    pub path: String,
}

/// Look for `.logdel.toml` in `project_dir` and its ancestors.
///
/// Returns `Ok(None)` if there is none. A file that exists but cannot be
/// read or parsed is an error, never silently skipped.
pub fn load_settings(project_dir: &Path) -> Result<Option<LoadedSettings>, ConfigError> {
    let start = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());

    for dir in start.ancestors() {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            debug!("using settings from {}", candidate.display());
            let config = EngineConfig::load(&candidate)?;
            return Ok(Some(LoadedSettings {
                config,
                source: SettingsSource::Discovered,
                path: candidate.to_string_lossy().to_string(),
            }));
        }
    }
    Ok(None)
}

/// Load settings from a file named on the command line.
pub fn load_explicit(path: &Path) -> Result<LoadedSettings, ConfigError> {
    let config = EngineConfig::load(path)?;
    Ok(LoadedSettings {
        config,
        source: SettingsSource::Explicit,
        path: path.to_string_lossy().to_string(),
    })
}

/// Directory to start settings discovery from for a target path.
pub fn discovery_root(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.to_path_buf()
    } else {
        match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Explicit settings win; otherwise discover from `target`.
pub fn resolve_settings(explicit: Option<&Path>, target: &Path) -> Result<Option<LoadedSettings>, ConfigError> {
    match explicit {
        Some(path) => load_explicit(path).map(Some),
        None => load_settings(&discovery_root(target)),
    }
}
