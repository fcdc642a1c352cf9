//! Error types for photo discovery and copying.
//!
//! Errors are split by concern. Per-file [`PipelineError`]s never escape a worker:
//! the classifier turns them into ledger entries, so their `Display` output is
//! exactly the text a user sees in the `ERRORS:` / `WARNINGS:` blocks.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for photofind operations.
#[derive(Error, Debug)]
pub enum FinderError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid photo requirements
    #[error("Invalid requirement: {0}")]
    Requirement(#[from] RequirementError),

    /// Per-file pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while building a [`Requirements`](crate::Requirements) bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    /// Color mode not in the supported vocabulary
    #[error("Photo mode={value} is unknown or unsupported. Supported ones are {supported}")]
    UnknownMode { value: String, supported: String },

    /// Encoding format not in the supported vocabulary
    #[error("Photo format={value} is unknown or unsupported. Supported ones are {supported}")]
    UnknownFormat { value: String, supported: String },

    /// Pixel size with a negative component
    #[error("Pixel size {width}x{height} is invalid: width and height can not be less than 0")]
    NegativeDimension { width: i64, height: i64 },

    /// Pixel size with a component too large for the decoder
    #[error("Pixel size {width}x{height} is invalid: width and height can not exceed {max}")]
    DimensionOutOfRange { width: i64, height: i64, max: u32 },

    /// Malformed `W:H,W:H,...` size list
    #[error(
        "Incorrect sizes pattern '{0}'. Set size in format width:height for one size or \
         width:height,width:height,... for several (maximum 10 sizes from 0:0 to 999999:999999)"
    )]
    InvalidSizeList(String),
}

/// Top-level precondition failures, detected before any traversal starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("find_dir \"{}\" does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("find_dir \"{}\" is not directory", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("copy_dir \"{}\" does not exist", .0.display())]
    DestinationMissing(PathBuf),

    #[error("copy_dir \"{}\" is not directory", .0.display())]
    DestinationNotDirectory(PathBuf),
}

/// Per-file failures, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image could not be opened or decoded
    #[error("Decode error for {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Decoded, but in a format outside the supported vocabulary
    #[error("Unsupported format for {}: {format}", path.display())]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Decoded, but with a color type outside the supported vocabulary
    #[error("Unsupported color mode for {}: {mode}", path.display())]
    UnsupportedMode { path: PathBuf, mode: String },

    /// Destination directory could not be created
    #[error(
        "Directory {} was not created, error={message}. File {} will not be copied",
        dir.display(),
        path.display()
    )]
    DestinationUncreatable {
        dir: PathBuf,
        path: PathBuf,
        message: String,
    },

    /// A file with the same name already exists in the destination
    #[error(
        "File {} will not be copied because file with name exists in copy_dir {}",
        path.display(),
        destination.display()
    )]
    NameCollision { path: PathBuf, destination: PathBuf },

    /// Copying the bytes or metadata failed
    #[error(
        "File {} will not be copied to {} because of error={message}",
        path.display(),
        destination.display()
    )]
    CopyFailed {
        path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    /// Directory entry could not be read during the walk
    #[error("Cannot read {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },
}

/// Convenience type alias for photofind results.
pub type Result<T> = std::result::Result<T, FinderError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_both_paths() {
        let err = PipelineError::NameCollision {
            path: PathBuf::from("/src/a.png"),
            destination: PathBuf::from("/dst"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/src/a.png"));
        assert!(msg.contains("/dst"));
    }

    #[test]
    fn test_unknown_mode_names_value_and_vocabulary() {
        let err = RequirementError::UnknownMode {
            value: "xyz".into(),
            supported: "L, RGB".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xyz"));
        assert!(msg.contains("L, RGB"));
    }

    #[test]
    fn test_requirement_error_converts_to_finder_error() {
        let err: FinderError = RequirementError::InvalidSizeList("1:".into()).into();
        assert!(matches!(err, FinderError::Requirement(_)));
    }
}
