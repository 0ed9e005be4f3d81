//! Error types for slide access and Deep Zoom generation.

use thiserror::Error;

/// Errors reported by a [`SlideReader`](crate::slide::SlideReader) implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlideError {
    /// Requested native level does not exist
    #[error("Level {level} out of range (slide has {level_count} levels)")]
    LevelOutOfRange { level: usize, level_count: usize },

    /// The underlying decoder failed to read pixel data
    #[error("Read error: {0}")]
    Read(String),
}

/// Errors produced by the Deep Zoom engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeepZoomError {
    /// Deep Zoom level outside `[0, level_count)`
    #[error("Invalid level {level}: pyramid has {level_count} levels")]
    InvalidLevel { level: usize, level_count: usize },

    /// Column or row outside the level's tile grid
    #[error("Invalid address: level {level}, col {col}, row {row}")]
    InvalidAddress { level: usize, col: i64, row: i64 },

    /// Tile size must be strictly positive
    #[error("Invalid tile size: must be greater than 0")]
    InvalidTileSize,

    /// Overlap must be smaller than the tile size
    #[error("Invalid overlap {overlap}: must be smaller than tile size {tile_size}")]
    InvalidOverlap { overlap: u32, tile_size: u32 },

    /// Slide reports no usable full-resolution level
    #[error("Invalid slide: {reason}")]
    InvalidSlide { reason: String },

    /// Error propagated verbatim from the slide reader
    #[error("Slide read failed: {0}")]
    SlideRead(#[from] SlideError),

    /// Raw region could not be turned into a tile image
    #[error("Failed to render tile: {message}")]
    Render { message: String },

    /// Tile image could not be encoded
    #[error("Failed to encode tile: {message}")]
    Encode { message: String },
}
