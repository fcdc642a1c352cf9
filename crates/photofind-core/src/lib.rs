//! Photofind Core - Embeddable image discovery and copying library.
//!
//! Photofind walks a directory tree, decodes every file that looks like an
//! image, and keeps the ones that satisfy a [`Requirements`] bundle (minimum
//! size alternatives, color modes and encoding formats). Matches can be copied
//! into a destination tree that mirrors the source layout.
//!
//! # Architecture
//!
//! ```text
//! Preconditions → Walk (sniff) → Worker pool (decode → match → copy) → Ledger
//! ```
//!
//! Every per-file failure ends up in the [`ResultLedger`]; a run never aborts
//! because of one bad file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use photofind_core::{PhotoFinder, PixelSize, Requirements, RunMode};
//!
//! #[tokio::main]
//! async fn main() -> photofind_core::Result<()> {
//!     let requirements = Requirements::any()
//!         .with_min_sizes(vec![PixelSize::new(1920, 1080)])
//!         .with_formats(["jpeg", "png"])?;
//!
//!     let finder = PhotoFinder::new().with_requirements(Some(requirements));
//!     let ledger = finder.search("./photos".as_ref(), true).await;
//!     println!("{}", ledger.short_summary(RunMode::Search));
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod requirements;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, FinderError, PipelineError, PipelineResult, PreconditionError, RequirementError,
    Result,
};
pub use ledger::{LedgerReport, ResultLedger, RunMode};
pub use pipeline::{
    discover_and_copy, FindRequest, ImageProbe, PhotoFinder, RunStats, StandardProbe,
};
pub use requirements::{
    parse_min_sizes, with_reversed_sizes, ColorMode, ImageMeta, PhotoFormat, PixelSize,
    Requirements,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_requirements_from_default_config_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(4, 4)
            .save(dir.path().join("a.png"))
            .unwrap();

        let requirements = Config::default().requirements().unwrap();
        let finder = PhotoFinder::new().with_requirements(Some(requirements));
        let ledger = finder.search(dir.path(), false).await;

        let report = ledger.snapshot();
        assert_eq!(report.found, vec![dir.path().join("a.png")]);
        assert!(!report.has_errors());
    }
}
