//! Configuration validation.

use crate::error::ConfigError;
use crate::requirements::{normalize_formats, normalize_modes, parse_min_sizes};

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];
const OUTPUT_FORMATS: &[&str] = &["text", "json"];

impl Config {
    /// Validate that every value is understood before anything runs.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for size in &self.search.min_sizes {
            parse_min_sizes(size)
                .map_err(|e| ConfigError::ValidationError(format!("search.min_sizes: {e}")))?;
        }
        normalize_modes(&self.search.modes)
            .map_err(|e| ConfigError::ValidationError(format!("search.modes: {e}")))?;
        normalize_formats(&self.search.formats)
            .map_err(|e| ConfigError::ValidationError(format!("search.formats: {e}")))?;

        check_one_of("output.format", &self.output.format, OUTPUT_FORMATS)?;
        check_one_of("logging.level", &self.logging.level, LOG_LEVELS)?;
        check_one_of("logging.format", &self.logging.format, LOG_FORMATS)?;
        Ok(())
    }
}

fn check_one_of(key: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{key} must be one of {}, got \"{value}\"",
            allowed.join(", ")
        )))
    }
}
