//! Tile rendering layer.
//!
//! This module turns the geometry computed by [`crate::deepzoom`] into pixels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     SlideReader::read_region()          │
//! │  (packed premultiplied ARGB samples)    │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             TileRenderer                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ argb_to_rgba │  │ compose onto    │  │
//! │  │ unpremultiply│  │ background +    │  │
//! │  │ (byte order) │  │ resize          │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            JpegTileEncoder              │
//! └─────────────────────────────────────────┘
//! ```

mod encoder;
mod pixel;
mod render;

pub use encoder::{
    clamp_quality, is_valid_quality, JpegTileEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use pixel::{argb_to_rgba, unpremultiply, PixelByteOrder};
pub use render::TileRenderer;
