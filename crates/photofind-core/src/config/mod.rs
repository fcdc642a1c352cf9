//! Configuration management for photofind.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a missing
//! key falls back silently.

mod types;
mod validate;

pub use types::*;

use crate::error::{ConfigError, RequirementError};
use crate::requirements::{parse_min_sizes, with_reversed_sizes, PixelSize, Requirements};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search settings
    pub search: SearchConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.photofind.photofind/config.toml
    /// - Linux: ~/.config/photofind/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\photofind\config\config.toml
    ///
    /// Falls back to ~/.photofind/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "photofind", "photofind")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".photofind").join("config.toml")
            })
    }

    /// The configured search directory with `~` expanded.
    pub fn find_dir(&self) -> Option<PathBuf> {
        self.search
            .find_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }

    /// Parsed `search.min_sizes`, without reversed alternatives.
    pub fn min_sizes(&self) -> Result<Vec<PixelSize>, RequirementError> {
        let mut sizes = Vec::new();
        for entry in &self.search.min_sizes {
            sizes.extend(parse_min_sizes(entry)?);
        }
        Ok(sizes)
    }

    /// Build the requirement bundle described by `[search]`.
    pub fn requirements(&self) -> Result<Requirements, RequirementError> {
        let mut sizes = self.min_sizes()?;
        if self.search.add_reverse_sizes {
            sizes = with_reversed_sizes(&sizes);
        }

        Requirements::any()
            .with_min_sizes(sizes)
            .with_modes(&self.search.modes)?
            .with_formats(&self.search.formats)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
