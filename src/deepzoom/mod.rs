//! Deep Zoom pyramid generation.
//!
//! # Architecture
//!
//! ```text
//! construction (once)                         queries (any number, any task)
//! ┌──────────────────────────┐
//! │ resolve_level_dimensions │ bounds restriction
//! └────────────┬─────────────┘
//!              ▼
//! ┌──────────────────────────┐
//! │ deep_zoom_levels         │ halve to 1x1        ┌──────────────────────┐
//! └────────────┬─────────────┘                     │ tile_info / tile     │
//!              ▼                                   │ (pure, no locking)   │
//! ┌──────────────────────────┐   DeepZoomLayout    ├──────────────────────┤
//! │ deep_zoom_tile_levels    │ ──── (Arc) ───────▶ │ TileStream           │
//! └────────────┬─────────────┘                     │ (background task)    │
//!              ▼                                   ├──────────────────────┤
//! ┌──────────────────────────┐                     │ read_tile            │
//! │ generate_downsamples     │ native level pick   │ (SlideReader + tile) │
//! └──────────────────────────┘                     └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wsi_deepzoom::{DeepZoomGenerator, SyntheticSlide};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wsi_deepzoom::DeepZoomError> {
//!     let slide = SyntheticSlide::new([(46920, 33600), (11730, 8400), (2932, 2100)]);
//!     let generator = DeepZoomGenerator::new(slide, 254, 1, false)?;
//!
//!     let mut tiles = generator.tiles();
//!     while let Some(tile) = tiles.next().await {
//!         let tile = tile?;
//!         let jpeg = generator.tile_jpeg(&tile, 80).await?;
//!         println!("{}/{}_{}: {} bytes", tile.level, tile.col, tile.row, jpeg.len());
//!     }
//!     Ok(())
//! }
//! ```

mod downsample;
mod dzi;
mod iter;
mod layout;
mod levels;

pub use downsample::{desired_downsample, generate_downsamples, LevelDownsample};
pub use dzi::{dzi_tile_path, generate_dzi_xml, DEFAULT_TILE_FORMAT};
pub use iter::{CancelHandle, TileStream};
pub use layout::{DeepZoomLayout, Tile, TileInfo, TileOverlap};
pub use levels::{
    deep_zoom_levels, deep_zoom_tile_levels, level0_offset, resolve_level_dimensions, tile_count,
};

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use tracing::trace;

use crate::error::DeepZoomError;
use crate::slide::properties::background_color;
use crate::slide::SlideReader;
use crate::tile::{JpegTileEncoder, PixelByteOrder, TileRenderer};

/// Default tile edge length, chosen so that tiles with overlap are 256 pixels.
pub const DEFAULT_TILE_SIZE: u32 = 254;

/// Default overlap on interior tile edges.
pub const DEFAULT_OVERLAP: u32 = 1;

// =============================================================================
// DeepZoomGenerator
// =============================================================================

/// Deep Zoom view of a slide.
///
/// Owns the immutable [`DeepZoomLayout`] and a shared handle to the slide.
/// Geometry queries never touch the slide; [`read_tile`](Self::read_tile) is
/// the only operation that reads pixels.
pub struct DeepZoomGenerator<S: SlideReader> {
    slide: Arc<S>,
    layout: Arc<DeepZoomLayout>,
    renderer: TileRenderer,
    encoder: JpegTileEncoder,
}

impl<S: SlideReader> DeepZoomGenerator<S> {
    /// Build the pyramid for `slide`.
    ///
    /// # Arguments
    ///
    /// * `tile_size` - Tile edge length in pixels, excluding overlap
    /// * `overlap` - Extra pixels added to interior tile edges
    /// * `limit_bounds` - Restrict the pyramid to the slide's declared bounds
    pub fn new(
        slide: S,
        tile_size: u32,
        overlap: u32,
        limit_bounds: bool,
    ) -> Result<Self, DeepZoomError> {
        Self::with_shared_slide(Arc::new(slide), tile_size, overlap, limit_bounds)
    }

    /// Build the pyramid for a slide that is shared with other components.
    pub fn with_shared_slide(
        slide: Arc<S>,
        tile_size: u32,
        overlap: u32,
        limit_bounds: bool,
    ) -> Result<Self, DeepZoomError> {
        let layout = DeepZoomLayout::new(slide.as_ref(), tile_size, overlap, limit_bounds)?;
        let renderer = TileRenderer::new(background_color(slide.as_ref()));

        Ok(Self {
            slide,
            layout: Arc::new(layout),
            renderer,
            encoder: JpegTileEncoder::new(),
        })
    }

    /// Override the byte order of samples returned by the slide.
    pub fn with_byte_order(mut self, byte_order: PixelByteOrder) -> Self {
        self.renderer = self.renderer.with_byte_order(byte_order);
        self
    }

    /// The underlying slide.
    pub fn slide(&self) -> &Arc<S> {
        &self.slide
    }

    /// The pyramid geometry.
    pub fn layout(&self) -> &Arc<DeepZoomLayout> {
        &self.layout
    }

    /// Number of Deep Zoom levels.
    pub fn level_count(&self) -> usize {
        self.layout.level_count()
    }

    /// Tile grid `(cols, rows)` of every level.
    pub fn level_tiles(&self) -> &[(u32, u32)] {
        self.layout.level_tiles()
    }

    /// Pixel dimensions of every level.
    pub fn level_dimensions(&self) -> &[(u32, u32)] {
        self.layout.level_dimensions()
    }

    /// Total number of tiles in the pyramid.
    pub fn tile_count(&self) -> u64 {
        self.layout.tile_count()
    }

    /// Map a tile address onto the slide.
    ///
    /// See [`DeepZoomLayout::tile_info`].
    pub fn tile_info(
        &self,
        level: usize,
        col: impl Into<i64>,
        row: impl Into<i64>,
    ) -> Result<TileInfo, DeepZoomError> {
        self.layout.tile_info(level, col, row)
    }

    /// Resolve a single tile.
    pub fn tile(
        &self,
        level: usize,
        col: impl Into<i64>,
        row: impl Into<i64>,
    ) -> Result<Tile, DeepZoomError> {
        self.layout.tile(level, col, row)
    }

    /// DZI XML descriptor for this pyramid.
    pub fn dzi(&self, format: &str) -> String {
        self.layout.dzi(format)
    }

    /// Enumerate every tile on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn tiles(&self) -> TileStream {
        self.tiles_with_cancel(CancelHandle::new())
    }

    /// Enumerate every tile, stopping when `cancel` fires.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn tiles_with_cancel(&self, cancel: CancelHandle) -> TileStream {
        TileStream::spawn(Arc::clone(&self.layout), cancel)
    }

    /// Read and render a tile.
    ///
    /// The source region is read from the slide, converted to RGBA, flattened
    /// onto the slide background and resized to the tile's output size.
    ///
    /// # Errors
    ///
    /// Slide read failures are returned as [`DeepZoomError::SlideRead`]
    /// without retrying.
    pub async fn read_tile(&self, tile: &Tile) -> Result<RgbaImage, DeepZoomError> {
        let TileInfo {
            source_location,
            source_size,
            output_size,
            slide_level,
        } = tile.info;

        trace!(
            level = tile.level,
            col = tile.col,
            row = tile.row,
            ?source_location,
            ?source_size,
            slide_level,
            "Reading tile"
        );

        let raw = self
            .slide
            .read_region(source_location, slide_level, source_size)
            .await?;

        self.renderer.render(&raw, source_size, output_size)
    }

    /// Read, render and JPEG-encode a tile.
    pub async fn tile_jpeg(&self, tile: &Tile, quality: u8) -> Result<Bytes, DeepZoomError> {
        let image = self.read_tile(tile).await?;
        self.encoder.encode(&image, quality)
    }
}
