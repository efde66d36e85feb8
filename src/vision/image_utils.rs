// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image format helpers for vision requests

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

/// MIME type used when the format cannot be sniffed
const FALLBACK_MIME: &str = "image/jpeg";

/// Detect image format from magic bytes
///
/// Returns `None` for anything that is not png, jpeg, webp, gif, bmp or tiff.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() < 4 {
        return None;
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => {
            Some(ImageFormat::WebP)
        }

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Some(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Some(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),

        _ => None,
    }
}

/// MIME type of the image, falling back to jpeg for unknown data
pub fn detect_mime_type(bytes: &[u8]) -> &'static str {
    detect_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Encode raw image bytes as a `data:` URL for OpenAI-compatible vision APIs
pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", detect_mime_type(bytes), STANDARD.encode(bytes))
}
