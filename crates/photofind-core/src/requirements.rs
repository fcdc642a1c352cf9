//! Photo requirements: minimum pixel sizes, allowed color modes, allowed formats.
//!
//! A [`Requirements`] bundle is immutable once built. The `with_*` methods consume
//! the bundle and hand back a new one, so a bundle shared between workers behind an
//! `Arc` never changes under them.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::RequirementError;

/// Maximum number of entries accepted by [`parse_min_sizes`].
pub const MAX_SIZE_ENTRIES: usize = 10;

/// Maximum digits per size component accepted by [`parse_min_sizes`].
const MAX_SIZE_DIGITS: usize = 6;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build a size from signed components, rejecting negative or oversized values.
    pub fn try_new(width: i64, height: i64) -> Result<Self, RequirementError> {
        if width < 0 || height < 0 {
            return Err(RequirementError::NegativeDimension { width, height });
        }
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(width), Ok(height)) => Ok(Self { width, height }),
            _ => Err(RequirementError::DimensionOutOfRange {
                width,
                height,
                max: u32::MAX,
            }),
        }
    }

    /// The same size with width and height swapped.
    pub fn reversed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// True when `width x height` meets or exceeds this size in both dimensions.
    pub fn is_covered_by(&self, width: u32, height: u32) -> bool {
        width >= self.width && height >= self.height
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Generates a closed, case-insensitively parsable vocabulary enum.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant,)+
        }

        impl $name {
            /// Every member of the vocabulary, in canonical order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Canonical upper-case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Comma-separated list of the canonical names.
            pub fn vocabulary() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RequirementError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| RequirementError::$error {
                        value: s.to_string(),
                        supported: Self::vocabulary(),
                    })
            }
        }
    };
}

vocabulary! {
    /// Pixel color layout reported by the decoder.
    ColorMode, UnknownMode {
        /// 8-bit luminance
        L => "L",
        /// 8-bit luminance with alpha
        La => "LA",
        Rgb => "RGB",
        Rgba => "RGBA",
        L16 => "L16",
        La16 => "LA16",
        Rgb16 => "RGB16",
        Rgba16 => "RGBA16",
        /// 32-bit float RGB (HDR, EXR)
        Rgb32F => "RGB32F",
        Rgba32F => "RGBA32F",
    }
}

vocabulary! {
    /// Encoding format reported by the decoder.
    PhotoFormat, UnknownFormat {
        Bmp => "BMP",
        Dds => "DDS",
        Exr => "EXR",
        Farbfeld => "FARBFELD",
        Gif => "GIF",
        Hdr => "HDR",
        Ico => "ICO",
        Jpeg => "JPEG",
        Png => "PNG",
        /// PBM / PGM / PPM / PAM
        Pnm => "PNM",
        Qoi => "QOI",
        Tga => "TGA",
        Tiff => "TIFF",
        WebP => "WEBP",
    }
}

/// Normalize caller-supplied mode names against the [`ColorMode`] vocabulary.
pub fn normalize_modes<I, S>(values: I) -> Result<BTreeSet<ColorMode>, RequirementError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| v.as_ref().parse()).collect()
}

/// Normalize caller-supplied format names against the [`PhotoFormat`] vocabulary.
pub fn normalize_formats<I, S>(values: I) -> Result<BTreeSet<PhotoFormat>, RequirementError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| v.as_ref().parse()).collect()
}

/// Parse a `W:H,W:H,...` list into pixel sizes.
///
/// A blank string means "no size constraint" and yields an empty list. Otherwise
/// between 1 and [`MAX_SIZE_ENTRIES`] entries are accepted, each component being
/// 1 to 6 decimal digits.
pub fn parse_min_sizes(value: &str) -> Result<Vec<PixelSize>, RequirementError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let invalid = || RequirementError::InvalidSizeList(value.to_string());
    let entries: Vec<&str> = value.split(',').collect();
    if entries.len() > MAX_SIZE_ENTRIES {
        return Err(invalid());
    }

    entries
        .into_iter()
        .map(|entry| {
            let (w, h) = entry.split_once(':').ok_or_else(invalid)?;
            Ok(PixelSize::new(
                parse_component(w).ok_or_else(invalid)?,
                parse_component(h).ok_or_else(invalid)?,
            ))
        })
        .collect()
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > MAX_SIZE_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Interleave every size with its width/height swap.
///
/// `[100:200]` becomes `[100:200, 200:100]`.
pub fn with_reversed_sizes(sizes: &[PixelSize]) -> Vec<PixelSize> {
    sizes.iter().flat_map(|s| [*s, s.reversed()]).collect()
}

/// Metadata the decoder reports for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub format: PhotoFormat,
    pub mode: ColorMode,
    pub width: u32,
    pub height: u32,
}

/// Immutable predicate bundle a file must satisfy to be "found".
///
/// Empty collections mean "unconstrained". Size entries are alternatives: a file
/// passes if it covers at least one of them in both dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Requirements {
    min_sizes: Vec<PixelSize>,
    modes: BTreeSet<ColorMode>,
    formats: BTreeSet<PhotoFormat>,
}

impl Requirements {
    /// Build a bundle from raw mode/format names.
    ///
    /// `None` or an empty slice leaves that dimension unconstrained.
    pub fn new<M: AsRef<str>, F: AsRef<str>>(
        min_sizes: Vec<PixelSize>,
        modes: Option<&[M]>,
        formats: Option<&[F]>,
    ) -> Result<Self, RequirementError> {
        Ok(Self {
            min_sizes,
            modes: modes.map(normalize_modes).transpose()?.unwrap_or_default(),
            formats: formats.map(normalize_formats).transpose()?.unwrap_or_default(),
        })
    }

    /// A bundle that accepts every decodable image.
    pub fn any() -> Self {
        Self::default()
    }

    /// Replace the size alternatives.
    pub fn with_min_sizes(self, min_sizes: Vec<PixelSize>) -> Self {
        Self { min_sizes, ..self }
    }

    /// Replace the allowed color modes. An empty list removes the constraint.
    pub fn with_modes<I, S>(self, modes: I) -> Result<Self, RequirementError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            modes: normalize_modes(modes)?,
            ..self
        })
    }

    /// Replace the allowed formats. An empty list removes the constraint.
    pub fn with_formats<I, S>(self, formats: I) -> Result<Self, RequirementError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            formats: normalize_formats(formats)?,
            ..self
        })
    }

    pub fn min_sizes(&self) -> &[PixelSize] {
        &self.min_sizes
    }

    pub fn modes(&self) -> &BTreeSet<ColorMode> {
        &self.modes
    }

    pub fn formats(&self) -> &BTreeSet<PhotoFormat> {
        &self.formats
    }

    /// Check decoded metadata against the bundle.
    pub fn evaluate(&self, meta: &ImageMeta) -> bool {
        (self.modes.is_empty() || self.modes.contains(&meta.mode))
            && (self.formats.is_empty() || self.formats.contains(&meta.format))
            && (self.min_sizes.is_empty()
                || self
                    .min_sizes
                    .iter()
                    .any(|s| s.is_covered_by(meta.width, meta.height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> ImageMeta {
        ImageMeta {
            format: PhotoFormat::Png,
            mode: ColorMode::Rgb,
            width,
            height,
        }
    }

    fn sized(sizes: &[(u32, u32)]) -> Requirements {
        Requirements::any()
            .with_min_sizes(sizes.iter().map(|&(w, h)| PixelSize::new(w, h)).collect())
    }

    #[test]
    fn test_no_sizes_accepts_any_dimensions() {
        let req = Requirements::any();
        assert!(req.evaluate(&meta(0, 0)));
        assert!(req.evaluate(&meta(1, 99_999)));
    }

    #[test]
    fn test_size_boundary_is_inclusive_in_both_dimensions() {
        let req = sized(&[(100, 100)]);
        assert!(!req.evaluate(&meta(99, 100)));
        assert!(!req.evaluate(&meta(100, 99)));
        assert!(req.evaluate(&meta(100, 100)));
    }

    #[test]
    fn test_sizes_are_alternatives() {
        let req = sized(&[(100, 200), (200, 100)]);
        assert!(!req.evaluate(&meta(300, 50)));
        assert!(req.evaluate(&meta(150, 250)));
        assert!(req.evaluate(&meta(250, 150)));
    }

    #[test]
    fn test_zero_size_is_trivially_satisfied() {
        let req = sized(&[(0, 0)]);
        assert!(req.evaluate(&meta(0, 0)));
        assert!(req.evaluate(&meta(1, 1)));
    }

    #[test]
    fn test_mode_and_format_whitelists() {
        let req = Requirements::any()
            .with_modes(["rgba"])
            .unwrap()
            .with_formats(["jpeg", "PNG"])
            .unwrap();
        assert!(!req.evaluate(&meta(10, 10)));

        let rgba_png = ImageMeta {
            mode: ColorMode::Rgba,
            ..meta(10, 10)
        };
        assert!(req.evaluate(&rgba_png));

        let rgba_gif = ImageMeta {
            format: PhotoFormat::Gif,
            ..rgba_png
        };
        assert!(!req.evaluate(&rgba_gif));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Requirements::new(vec![], Some(&["RGB", "xyz"][..]), None::<&[&str]>).unwrap_err();
        match err {
            RequirementError::UnknownMode { value, supported } => {
                assert_eq!(value, "xyz");
                assert!(supported.contains("RGBA"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = normalize_formats(["png", "psd"]).unwrap_err();
        assert!(err.to_string().contains("psd"));
        assert!(err.to_string().contains("JPEG"));
    }

    #[test]
    fn test_normalization_is_case_insensitive_and_deduplicates() {
        let modes = normalize_modes(["rgb", "RGB", "La"]).unwrap();
        assert_eq!(
            modes.into_iter().collect::<Vec<_>>(),
            vec![ColorMode::La, ColorMode::Rgb]
        );
    }

    #[test]
    fn test_empty_whitelist_is_unconstrained() {
        let req = Requirements::new::<&str, &str>(vec![], Some(&[][..]), None).unwrap();
        assert!(req.modes().is_empty());
        assert!(req.evaluate(&meta(1, 1)));
    }

    #[test]
    fn test_modes_and_formats_accept_different_string_types() {
        let modes = vec![String::from("rgb")];
        let req = Requirements::new(vec![], Some(&modes[..]), Some(&["png"][..])).unwrap();
        assert!(req.modes().contains(&ColorMode::Rgb));
        assert!(req.formats().contains(&PhotoFormat::Png));
    }

    #[test]
    fn test_parse_min_sizes() {
        assert_eq!(
            parse_min_sizes("1920:1080,0:0").unwrap(),
            vec![PixelSize::new(1920, 1080), PixelSize::new(0, 0)]
        );
        assert!(parse_min_sizes("").unwrap().is_empty());
        assert!(parse_min_sizes("100").is_err());
        assert!(parse_min_sizes("100:").is_err());
        assert!(parse_min_sizes("-1:10").is_err());
        assert!(parse_min_sizes("1000000:1").is_err());
        assert!(parse_min_sizes("1:1,").is_err());
    }

    #[test]
    fn test_parse_min_sizes_limits_entry_count() {
        let ten = vec!["1:1"; 10].join(",");
        let eleven = vec!["1:1"; 11].join(",");
        assert_eq!(parse_min_sizes(&ten).unwrap().len(), 10);
        assert!(parse_min_sizes(&eleven).is_err());
    }

    #[test]
    fn test_with_reversed_sizes() {
        let sizes = with_reversed_sizes(&[PixelSize::new(100, 200)]);
        assert_eq!(sizes, vec![PixelSize::new(100, 200), PixelSize::new(200, 100)]);
    }

    #[test]
    fn test_pixel_size_rejects_negative() {
        assert!(PixelSize::try_new(-1, 5).is_err());
        assert!(PixelSize::try_new(5, -1).is_err());
        assert_eq!(PixelSize::try_new(0, 0).unwrap(), PixelSize::new(0, 0));
    }

    #[test]
    fn test_pixel_size_rejects_oversized() {
        let err = PixelSize::try_new(5_000_000_000, 1).unwrap_err();
        assert!(matches!(err, RequirementError::DimensionOutOfRange { .. }));
        assert!(!err.to_string().contains("less than 0"));
        assert!(matches!(
            PixelSize::try_new(-1, 5_000_000_000).unwrap_err(),
            RequirementError::NegativeDimension { .. }
        ));
    }
}
