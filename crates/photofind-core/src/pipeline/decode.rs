//! Full image decode with format detection.

use image::{ColorType, GenericImageView, ImageFormat, ImageReader};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::requirements::{ColorMode, ImageMeta, PhotoFormat};

/// Decodes images with the `image` crate and reports their metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode the whole file and report format, color mode and dimensions.
    ///
    /// The pixels are decoded, not just the header, so truncated or corrupt
    /// files fail here instead of being reported as matches.
    pub fn inspect(&self, path: &Path) -> PipelineResult<ImageMeta> {
        let decode_err = |message: String| PipelineError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let reader = ImageReader::open(path)
            .map_err(|e| decode_err(format!("Cannot open file: {}", e)))?
            .with_guessed_format()
            .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))?;

        let image_format = reader
            .format()
            .ok_or_else(|| decode_err("Unrecognized image format".to_string()))?;
        let format = format_from_image(image_format).ok_or_else(|| {
            PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format!("{:?}", image_format),
            }
        })?;

        let image = reader.decode().map_err(|e| decode_err(e.to_string()))?;

        let color = image.color();
        let mode = mode_from_color(color).ok_or_else(|| PipelineError::UnsupportedMode {
            path: path.to_path_buf(),
            mode: format!("{:?}", color),
        })?;

        let (width, height) = image.dimensions();
        Ok(ImageMeta {
            format,
            mode,
            width,
            height,
        })
    }
}

/// Map a decoder format onto the supported vocabulary.
pub fn format_from_image(format: ImageFormat) -> Option<PhotoFormat> {
    match format {
        ImageFormat::Bmp => Some(PhotoFormat::Bmp),
        ImageFormat::Dds => Some(PhotoFormat::Dds),
        ImageFormat::OpenExr => Some(PhotoFormat::Exr),
        ImageFormat::Farbfeld => Some(PhotoFormat::Farbfeld),
        ImageFormat::Gif => Some(PhotoFormat::Gif),
        ImageFormat::Hdr => Some(PhotoFormat::Hdr),
        ImageFormat::Ico => Some(PhotoFormat::Ico),
        ImageFormat::Jpeg => Some(PhotoFormat::Jpeg),
        ImageFormat::Png => Some(PhotoFormat::Png),
        ImageFormat::Pnm => Some(PhotoFormat::Pnm),
        ImageFormat::Qoi => Some(PhotoFormat::Qoi),
        ImageFormat::Tga => Some(PhotoFormat::Tga),
        ImageFormat::Tiff => Some(PhotoFormat::Tiff),
        ImageFormat::WebP => Some(PhotoFormat::WebP),
        _ => None,
    }
}

/// Map a decoder color type onto the supported vocabulary.
pub fn mode_from_color(color: ColorType) -> Option<ColorMode> {
    match color {
        ColorType::L8 => Some(ColorMode::L),
        ColorType::La8 => Some(ColorMode::La),
        ColorType::Rgb8 => Some(ColorMode::Rgb),
        ColorType::Rgba8 => Some(ColorMode::Rgba),
        ColorType::L16 => Some(ColorMode::L16),
        ColorType::La16 => Some(ColorMode::La16),
        ColorType::Rgb16 => Some(ColorMode::Rgb16),
        ColorType::Rgba16 => Some(ColorMode::Rgba16),
        ColorType::Rgb32F => Some(ColorMode::Rgb32F),
        ColorType::Rgba32F => Some(ColorMode::Rgba32F),
        _ => None,
    }
}
