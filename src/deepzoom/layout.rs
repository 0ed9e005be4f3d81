//! Immutable pyramid metadata and per-tile coordinate mapping.

use serde::Serialize;
use tracing::debug;

use crate::error::DeepZoomError;
use crate::slide::SlideReader;

use super::downsample::{generate_downsamples, LevelDownsample};
use super::dzi::generate_dzi_xml;
use super::levels::{
    deep_zoom_levels, deep_zoom_tile_levels, level0_offset, resolve_level_dimensions,
};

// =============================================================================
// Tile Types
// =============================================================================

/// Where a tile comes from and how large it ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileInfo {
    /// Top-left corner to read, in level 0 coordinates (bounds offset applied)
    pub source_location: (i64, i64),

    /// Extent to read, in pixels of `slide_level`
    pub source_size: (u32, u32),

    /// Final tile size, overlap included
    pub output_size: (u32, u32),

    /// Native level to read from
    pub slide_level: usize,
}

/// A Deep Zoom tile address with its resolved geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tile {
    /// Deep Zoom level (0 = coarsest)
    pub level: usize,

    /// Column within the level's grid
    pub col: u32,

    /// Row within the level's grid
    pub row: u32,

    /// Resolved source and output geometry
    #[serde(flatten)]
    pub info: TileInfo,
}

/// Overlap pixels added on each edge of a tile.
///
/// Only interior edges get overlap: the first column has no left overlap, the
/// last column no right overlap, and likewise for rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileOverlap {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl TileOverlap {
    /// Overlap for the tile at `(col, row)` in a grid of `tiles` = `(cols, rows)`.
    pub fn new(tiles: (u32, u32), overlap: u32, col: u32, row: u32) -> Self {
        let edge = |interior: bool| if interior { overlap } else { 0 };
        Self {
            left: edge(col != 0),
            top: edge(row != 0),
            right: edge(col + 1 != tiles.0),
            bottom: edge(row + 1 != tiles.1),
        }
    }
}

// =============================================================================
// DeepZoomLayout
// =============================================================================

/// Geometry of a Deep Zoom pyramid over a slide.
///
/// Built once from the slide's metadata and immutable afterwards, so it can be
/// shared freely between tasks. All tile queries are pure functions of it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepZoomLayout {
    tile_size: u32,
    overlap: u32,
    level0_offset: (i64, i64),
    /// Native level dimensions after bounds restriction
    slide_levels: Vec<(u32, u32)>,
    /// Deep Zoom level dimensions, coarsest first
    levels: Vec<(u32, u32)>,
    /// Tile grid per Deep Zoom level
    level_tiles: Vec<(u32, u32)>,
    downsamples: Vec<LevelDownsample>,
}

impl DeepZoomLayout {
    /// Derive the pyramid for `slide`.
    ///
    /// # Errors
    ///
    /// - [`DeepZoomError::InvalidTileSize`] if `tile_size` is 0
    /// - [`DeepZoomError::InvalidOverlap`] if `overlap >= tile_size`
    /// - [`DeepZoomError::InvalidSlide`] if the slide has no level 0, a
    ///   zero-sized level 0, a non-positive level 0 downsample, or levels it
    ///   cannot describe
    pub fn new<S: SlideReader + ?Sized>(
        slide: &S,
        tile_size: u32,
        overlap: u32,
        limit_bounds: bool,
    ) -> Result<Self, DeepZoomError> {
        if tile_size == 0 {
            return Err(DeepZoomError::InvalidTileSize);
        }
        if overlap >= tile_size {
            return Err(DeepZoomError::InvalidOverlap { overlap, tile_size });
        }
        validate_slide(slide)?;

        let slide_levels = resolve_level_dimensions(slide, limit_bounds)?;
        let levels = deep_zoom_levels(slide_levels[0]);
        let level_tiles = deep_zoom_tile_levels(tile_size, &levels);
        let downsamples = generate_downsamples(slide, levels.len())?;
        let level0_offset = level0_offset(slide, limit_bounds);

        let layout = Self {
            tile_size,
            overlap,
            level0_offset,
            slide_levels,
            levels,
            level_tiles,
            downsamples,
        };

        let (base_width, base_height) = layout.dimensions();
        debug!(
            base_width,
            base_height,
            levels = layout.level_count(),
            tiles = layout.tile_count(),
            tile_size,
            overlap,
            limit_bounds,
            "Built Deep Zoom layout"
        );

        Ok(layout)
    }

    /// Edge length of a tile, excluding overlap.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Overlap added to interior tile edges.
    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    /// Offset of the active area in level 0 pixels.
    pub fn level0_offset(&self) -> (i64, i64) {
        self.level0_offset
    }

    /// Native level dimensions after bounds restriction.
    pub fn slide_level_dimensions(&self) -> &[(u32, u32)] {
        &self.slide_levels
    }

    /// Number of Deep Zoom levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Pixel dimensions of every Deep Zoom level, coarsest first.
    pub fn level_dimensions(&self) -> &[(u32, u32)] {
        &self.levels
    }

    /// Tile grid `(cols, rows)` of every Deep Zoom level.
    pub fn level_tiles(&self) -> &[(u32, u32)] {
        &self.level_tiles
    }

    /// Tile grid of one level, or `None` if the level does not exist.
    pub fn level_tiles_at(&self, level: usize) -> Option<(u32, u32)> {
        self.level_tiles.get(level).copied()
    }

    /// Full-resolution dimensions of the pyramid.
    pub fn dimensions(&self) -> (u32, u32) {
        self.levels[self.levels.len() - 1]
    }

    /// Native level bindings for every Deep Zoom level.
    pub fn downsamples(&self) -> &[LevelDownsample] {
        &self.downsamples
    }

    /// Total number of tiles across all levels.
    pub fn tile_count(&self) -> u64 {
        self.level_tiles
            .iter()
            .map(|&(cols, rows)| cols as u64 * rows as u64)
            .sum()
    }

    /// DZI XML descriptor for this pyramid.
    pub fn dzi(&self, format: &str) -> String {
        let (width, height) = self.dimensions();
        generate_dzi_xml(width, height, self.tile_size, self.overlap, format)
    }

    /// Resolve the tile at `(level, col, row)`.
    ///
    /// Accepts grid coordinates as returned in [`Tile`] (`u32`) as well as
    /// signed values.
    pub fn tile(
        &self,
        level: usize,
        col: impl Into<i64>,
        row: impl Into<i64>,
    ) -> Result<Tile, DeepZoomError> {
        let (col, row) = (col.into(), row.into());
        let info = self.tile_info(level, col, row)?;
        Ok(Tile {
            level,
            col: col as u32,
            row: row as u32,
            info,
        })
    }

    /// Map a tile address onto the slide.
    ///
    /// # Errors
    ///
    /// - [`DeepZoomError::InvalidLevel`] if `level >= level_count()`
    /// - [`DeepZoomError::InvalidAddress`] if `col` or `row` is negative or
    ///   outside the level's tile grid
    pub fn tile_info(
        &self,
        level: usize,
        col: impl Into<i64>,
        row: impl Into<i64>,
    ) -> Result<TileInfo, DeepZoomError> {
        let (col, row) = (col.into(), row.into());
        let (cols, rows) = self
            .level_tiles_at(level)
            .ok_or(DeepZoomError::InvalidLevel {
                level,
                level_count: self.level_count(),
            })?;
        if col < 0 || row < 0 || col >= cols as i64 || row >= rows as i64 {
            return Err(DeepZoomError::InvalidAddress { level, col, row });
        }
        let (col, row) = (col as u32, row as u32);

        let binding = &self.downsamples[level];
        let (level_width, level_height) = self.levels[level];
        let tile_size = self.tile_size as f64;
        let overlap = TileOverlap::new((cols, rows), self.overlap, col, row);

        // Tile size in this level, overlap included
        let output_size = (
            output_extent(self.tile_size, level_width, col, overlap.left, overlap.right),
            output_extent(self.tile_size, level_height, row, overlap.top, overlap.bottom),
        );

        // Grid origin in this level, then shifted by the leading overlap into
        // native level space
        let z_location = (tile_size * col as f64, tile_size * row as f64);
        let l_location = (
            binding.residual_downsample * (z_location.0 - overlap.left as f64),
            binding.residual_downsample * (z_location.1 - overlap.top as f64),
        );

        // Round location down and size up, and add offset of active area
        let source_location = (
            (binding.level_downsample * l_location.0 + self.level0_offset.0 as f64) as i64,
            (binding.level_downsample * l_location.1 + self.level0_offset.1 as f64) as i64,
        );
        let (native_width, native_height) = binding.level_dimensions;
        let source_size = (
            source_extent(binding.residual_downsample, output_size.0, native_width, l_location.0),
            source_extent(binding.residual_downsample, output_size.1, native_height, l_location.1),
        );

        Ok(TileInfo {
            source_location,
            source_size,
            output_size,
            slide_level: binding.slide_level,
        })
    }
}

fn validate_slide<S: SlideReader + ?Sized>(slide: &S) -> Result<(), DeepZoomError> {
    let (width, height) = slide.dimensions().ok_or_else(|| DeepZoomError::InvalidSlide {
        reason: "slide has no levels".to_string(),
    })?;
    if width == 0 || height == 0 {
        return Err(DeepZoomError::InvalidSlide {
            reason: format!("level 0 is empty ({width}x{height})"),
        });
    }

    let downsample = slide.level_downsample(0).unwrap_or(0.0);
    if downsample.is_nan() || downsample <= 0.0 {
        return Err(DeepZoomError::InvalidSlide {
            reason: format!("level 0 downsample must be positive, got {downsample}"),
        });
    }

    Ok(())
}

/// `min(tile_size, level_extent - tile_size * coord) + before + after`, saturating at `u32::MAX`
fn output_extent(tile_size: u32, level_extent: u32, coord: u32, before: u32, after: u32) -> u32 {
    let remaining = (level_extent as u64).saturating_sub(tile_size as u64 * coord as u64);
    let extent = remaining.min(tile_size as u64) + before as u64 + after as u64;
    u32::try_from(extent).unwrap_or(u32::MAX)
}

/// `min(ceil(residual * output), native_extent - ceil(l_location))`, saturating at 0
fn source_extent(residual: f64, output: u32, native_extent: u32, l_location: f64) -> u32 {
    let wanted = (residual * output as f64).ceil();
    let available = native_extent as f64 - l_location.ceil();
    wanted.min(available).max(0.0) as u32
}

// =============================================================================
// Tests
// =============================================================================
