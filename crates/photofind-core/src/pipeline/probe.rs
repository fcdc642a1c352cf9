//! The image-inspection seam between the engine and the decoding library.

use std::path::Path;

use crate::error::PipelineResult;
use crate::requirements::ImageMeta;

use super::decode::ImageDecoder;
use super::sniff::looks_like_image;

/// Answers the two questions the engine asks about a file.
///
/// Implementations are shared by every worker, so they must be `Send + Sync`.
pub trait ImageProbe: Send + Sync {
    /// Cheap check used by the walker to decide whether to dispatch a file at all.
    fn sniff(&self, path: &Path) -> bool;

    /// Full decode reporting format, color mode and dimensions.
    fn inspect(&self, path: &Path) -> PipelineResult<ImageMeta>;
}

/// Probe backed by magic-byte sniffing and the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardProbe {
    decoder: ImageDecoder,
}

impl StandardProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageProbe for StandardProbe {
    fn sniff(&self, path: &Path) -> bool {
        looks_like_image(path)
    }

    fn inspect(&self, path: &Path) -> PipelineResult<ImageMeta> {
        self.decoder.inspect(path)
    }
}
