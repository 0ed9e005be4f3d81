//! JPEG tile encoder.
//!
//! Rendered tiles are always opaque (they are flattened onto the slide
//! background), so the alpha channel is dropped before encoding.

use bytes::Bytes;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;

use crate::error::DeepZoomError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// JPEG Encoder
// =============================================================================

/// JPEG encoder for rendered tiles.
///
/// # Example
///
/// ```ignore
/// use wsi_deepzoom::tile::JpegTileEncoder;
///
/// let encoder = JpegTileEncoder::new();
/// let jpeg = encoder.encode(&tile_image, 85)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct JpegTileEncoder {}

impl JpegTileEncoder {
    /// Create a new JPEG tile encoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a tile at the specified quality.
    ///
    /// Quality is clamped to `1..=100`.
    pub fn encode(&self, tile: &RgbaImage, quality: u8) -> Result<Bytes, DeepZoomError> {
        let quality = clamp_quality(quality);
        let rgb: RgbImage = tile.convert();

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

        encoder
            .encode_image(&rgb)
            .map_err(|e| DeepZoomError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    /// Get JPEG dimensions without fully decoding.
    ///
    /// # Returns
    ///
    /// `(width, height)` in pixels.
    pub fn dimensions(&self, jpeg: &[u8]) -> Result<(u32, u32), DeepZoomError> {
        let reader = ImageReader::with_format(Cursor::new(jpeg), image::ImageFormat::Jpeg);

        reader
            .into_dimensions()
            .map_err(|e| DeepZoomError::Encode {
                message: e.to_string(),
            })
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
