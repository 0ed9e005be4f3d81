//! Turning a raw slide region into a finished tile image.
//!
//! A region read from the slide is converted to straight RGBA, flattened onto
//! the slide's background colour, and resized to the tile's output size when
//! the native level did not match the Deep Zoom level exactly.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::DeepZoomError;
use crate::slide::properties::DEFAULT_BACKGROUND;

use super::pixel::{argb_to_rgba, unpremultiply, PixelByteOrder};

/// Renders raw regions into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRenderer {
    background: Rgba<u8>,
    byte_order: PixelByteOrder,
}

impl TileRenderer {
    /// Create a renderer for the given background, using the host byte order.
    pub fn new(background: Rgba<u8>) -> Self {
        Self {
            background,
            byte_order: PixelByteOrder::native(),
        }
    }

    /// Override the byte order of incoming samples.
    pub fn with_byte_order(mut self, byte_order: PixelByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Decode packed ARGB samples of a `size` region into an RGBA image.
    ///
    /// # Errors
    ///
    /// Returns [`DeepZoomError::Render`] if `raw` does not hold exactly
    /// `width * height` samples.
    pub fn decode_region(
        &self,
        raw: &[u8],
        size: (u32, u32),
    ) -> Result<RgbaImage, DeepZoomError> {
        let (width, height) = size;
        let expected = width as usize * height as usize * 4;
        if raw.len() != expected {
            return Err(DeepZoomError::Render {
                message: format!(
                    "region {width}x{height} needs {expected} bytes, got {}",
                    raw.len()
                ),
            });
        }

        let mut pixels = raw.to_vec();
        argb_to_rgba(&mut pixels, self.byte_order);
        unpremultiply(&mut pixels);

        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| DeepZoomError::Render {
            message: format!("cannot build {width}x{height} image"),
        })
    }

    /// Flatten `region` onto the background and fit it to `output_size`.
    ///
    /// The region is scaled to exactly `output_size`, each axis independently,
    /// so a tile always has the size its [`TileInfo`](crate::TileInfo) reports.
    pub fn compose(&self, region: &RgbaImage, output_size: (u32, u32)) -> RgbaImage {
        let (out_width, out_height) = output_size;
        if region.width() == 0 || region.height() == 0 {
            return RgbaImage::from_pixel(out_width, out_height, self.background);
        }

        let mut canvas = RgbaImage::from_pixel(region.width(), region.height(), self.background);
        imageops::overlay(&mut canvas, region, 0, 0);

        if canvas.dimensions() == output_size {
            canvas
        } else {
            imageops::resize(&canvas, out_width, out_height, FilterType::Lanczos3)
        }
    }

    /// Decode and compose in one step.
    pub fn render(
        &self,
        raw: &[u8],
        source_size: (u32, u32),
        output_size: (u32, u32),
    ) -> Result<RgbaImage, DeepZoomError> {
        let region = self.decode_region(raw, source_size)?;
        Ok(self.compose(&region, output_size))
    }
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}
