//! Cheap image-type detection used by the walker before dispatching a file.
//!
//! Only the first bytes of the file are read. Formats without a magic number
//! (TGA) are recognized by extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read from the start of every candidate.
const HEADER_LEN: usize = 12;

/// Extensions accepted when the header has no recognizable signature.
const EXTENSION_ONLY: &[&str] = &["tga", "icb", "vda", "vst"];

/// ISO-BMFF brands of still-image containers.
const IMAGE_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"mif1", b"msf1", b"avif", b"avis"];

/// Returns true when `path` looks like an image file.
///
/// Unreadable files return false; they are not candidates.
pub fn looks_like_image(path: &Path) -> bool {
    let mut header = [0u8; HEADER_LEN];
    let bytes_read = match File::open(path).and_then(|mut f| read_header(&mut f, &mut header)) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!("Cannot sniff {:?}: {}", path, e);
            return false;
        }
    };

    is_image_header(&header[..bytes_read]) || has_extension_only_format(path)
}

fn read_header(file: &mut File, header: &mut [u8; HEADER_LEN]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < HEADER_LEN {
        let n = file.read(&mut header[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

fn has_extension_only_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSION_ONLY.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Check if the header bytes match a known image signature.
pub(crate) fn is_image_header(header: &[u8]) -> bool {
    if header.len() < 2 {
        return false;
    }

    // BMP: BM
    if header.starts_with(b"BM") {
        return true;
    }

    // PNM: P1..P7
    if header[0] == b'P' && (b'1'..=b'7').contains(&header[1]) {
        return true;
    }

    if header.len() < 4 {
        return false;
    }

    let signatures: &[&[u8]] = &[
        &[0xFF, 0xD8, 0xFF],          // JPEG
        &[0x89, b'P', b'N', b'G'],    // PNG
        b"GIF8",                      // GIF
        b"II\x2A\x00",                // TIFF little-endian
        b"MM\x00\x2A",                // TIFF big-endian
        &[0x00, 0x00, 0x01, 0x00],    // ICO
        b"qoif",                      // QOI
        b"DDS ",                      // DDS
        &[0x76, 0x2F, 0x31, 0x01],    // OpenEXR
        b"farbfeld",                  // farbfeld
        b"#?RADIANCE",                // Radiance HDR
        b"#?RGBE",                    // Radiance HDR
    ];
    if signatures.iter().any(|sig| header.starts_with(sig)) {
        return true;
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") {
        return header.len() >= 12 && &header[8..12] == b"WEBP";
    }

    // HEIF/AVIF: ftyp box at offset 4 with an image brand
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return IMAGE_BRANDS.iter().any(|brand| &header[8..12] == *brand);
    }

    false
}
