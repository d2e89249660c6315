use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Marker that opts a line (and, for the import, the file) out of removal.
pub const DEFAULT_MARKER: &str = "nocheck:thislog";

/// Statement-level entry points of Go's `log` package.
pub const DEFAULT_ENTRY_POINTS: &[&str] = &[
    "Print", "Printf", "Println", "Fatal", "Fatalf", "Fatalln", "Panic", "Panicf", "Panicln",
];

/// How a call's callee is compared against the logging facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Resolve the callee and compare declared identities.
    #[default]
    Symbol,
    /// Compare the qualifier's text against the package name.
    Name,
}

/// When the facility's import is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Removed unless the marker appears anywhere in the file.
    #[default]
    FileFlag,
    /// Removed only when no reference to the package survives the rewrite.
    Symmetric,
}

/// Renderer for the rewritten file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formatter {
    /// Splice deletions into the original text.
    Builtin,
    /// Splice, then pipe the result through `gofmt`. Falls back to the
    /// builtin output when `gofmt` is not on `PATH`.
    #[default]
    Gofmt,
}

/// The logging package being stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFacility {
    /// Import path, e.g. `log`.
    pub package_path: String,
    /// Exported functions whose calls are removed.
    pub entry_points: Vec<String>,
}

impl Default for LogFacility {
    fn default() -> Self {
        Self {
            package_path: "log".to_string(),
            entry_points: DEFAULT_ENTRY_POINTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LogFacility {
    /// Name the package declares, assumed to be the last path element.
    pub fn package_name(&self) -> String {
        logdel_core::semantics::go::model::default_package_name(&self.package_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub facility: LogFacility,
    pub marker: String,
    pub match_mode: MatchMode,
    pub import_policy: ImportPolicy,
    pub formatter: Formatter,
    /// Upper bound on files rewritten concurrently within a package.
    pub max_parallel_files: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            facility: LogFacility::default(),
            marker: DEFAULT_MARKER.to_string(),
            match_mode: MatchMode::default(),
            import_policy: ImportPolicy::default(),
            formatter: Formatter::default(),
            max_parallel_files: 16,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML settings document.
    pub fn from_toml_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.facility.package_path.trim().is_empty() {
            return Err(ConfigError::Value(
                "facility.package_path must not be empty".to_string(),
            ));
        }
        if self.marker.trim().is_empty() {
            return Err(ConfigError::Value("marker must not be empty".to_string()));
        }
        if self.max_parallel_files == 0 {
            return Err(ConfigError::Value(
                "max_parallel_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
