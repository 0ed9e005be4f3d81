//! # WSI Deep Zoom
//!
//! Deep Zoom pyramid geometry for Whole Slide Images (WSI).
//!
//! Whole Slide Images store a handful of native resolution levels. Deep Zoom
//! viewers expect a full power-of-two pyramid cut into fixed-size tiles. This
//! library bridges the two: it derives the Deep Zoom levels and tile grids from
//! a slide's metadata, maps every tile onto the best native level, and renders
//! tiles through a pluggable slide reader.
//!
//! ## Features
//!
//! - **Pyramid geometry**: level chain, tile grids and per-tile source regions
//! - **Bounds support**: restrict the pyramid to the slide's non-empty region
//! - **Lazy enumeration**: cancellable tile stream on a background task
//! - **Rendering**: ARGB decoding, background compositing, resizing and JPEG encoding
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`slide`] - Slide reader contract, property helpers and a synthetic slide
//! - [`deepzoom`] - Pyramid layout, tile mapping, enumeration and the generator
//! - [`tile`] - Pixel conversion, tile rendering and encoding
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use wsi_deepzoom::{DeepZoomGenerator, SyntheticSlide};
//!
//! let slide = SyntheticSlide::new([(1000, 1000)]);
//! let generator = DeepZoomGenerator::new(slide, 512, 0, false).unwrap();
//!
//! let info = generator.tile_info(10, 1, 1).unwrap();
//! assert_eq!(info.output_size, (488, 488));
//! assert_eq!(info.source_location, (512, 512));
//! ```

pub mod config;
pub mod deepzoom;
pub mod error;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, DziConfig, GenerateConfig, InfoConfig, PyramidArgs};
pub use deepzoom::{
    desired_downsample, dzi_tile_path, generate_dzi_xml, CancelHandle, DeepZoomGenerator,
    DeepZoomLayout, LevelDownsample, Tile, TileInfo, TileOverlap, TileStream, DEFAULT_OVERLAP,
    DEFAULT_TILE_FORMAT, DEFAULT_TILE_SIZE,
};
pub use error::{DeepZoomError, SlideError};
pub use slide::{NativeLevel, SlideReader, SyntheticSlide};
pub use tile::{
    argb_to_rgba, JpegTileEncoder, PixelByteOrder, TileRenderer, DEFAULT_JPEG_QUALITY,
};
