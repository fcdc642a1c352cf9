//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Search settings: where to look and what counts as a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Directory to search when none is given on the command line (`~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_dir: Option<String>,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Minimum sizes as `"W:H"` strings; a file must cover at least one
    pub min_sizes: Vec<String>,

    /// Also accept every minimum size rotated by 90 degrees
    pub add_reverse_sizes: bool,

    /// Allowed color modes (empty = any)
    pub modes: Vec<String>,

    /// Allowed formats (empty = any)
    pub formats: Vec<String>,
}

/// Result rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// List every found/copied/not copied path after the summary
    pub extended: bool,

    /// Output format: "text" or "json"
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extended: false,
            format: "text".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            format: "pretty".to_string(),
        }
    }
}
