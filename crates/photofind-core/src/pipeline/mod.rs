//! Discovery and copy pipeline.
//!
//! - **sniff**: Cheap magic-byte check deciding which files are candidates
//! - **decode**: Full decode reporting format, color mode and dimensions
//! - **probe**: The `ImageProbe` seam combining sniff and decode
//! - **transfer**: Directory creation and metadata-preserving copy
//! - **classify**: Per-file worker recording outcomes in the ledger
//! - **walker**: Directory traversal with destination mirroring
//! - **engine**: Preconditions, worker pool and the final join

pub mod classify;
pub mod decode;
pub mod engine;
pub mod probe;
pub mod sniff;
pub mod transfer;
pub mod walker;

// Re-exports for convenient access
pub use classify::{ClassifyTask, FileClassifier, FileOutcome};
pub use decode::ImageDecoder;
pub use engine::{default_workers, discover_and_copy, FindRequest, PhotoFinder, RunStats};
pub use probe::{ImageProbe, StandardProbe};
pub use walker::{same_location, TreeWalker, WalkStats};
