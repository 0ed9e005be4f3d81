//! Level dimension resolution, Deep Zoom level chain and tile grids.
//!
//! # Level Numbering
//!
//! Deep Zoom uses an inverted level numbering compared to WSI pyramids:
//! - Deep Zoom level 0 = 1x1 pixel (lowest resolution)
//! - Deep Zoom max level = full resolution
//!
//! Native slide levels run the other way (level 0 = full resolution).

use tracing::warn;

use crate::error::DeepZoomError;
use crate::slide::properties::{
    integer_property, PROPERTY_BOUNDS_HEIGHT, PROPERTY_BOUNDS_WIDTH, PROPERTY_BOUNDS_X,
    PROPERTY_BOUNDS_Y,
};
use crate::slide::SlideReader;

/// Native level dimensions after optional bounds restriction.
///
/// When `limit_bounds` is set, every level is scaled by the ratio between the
/// declared bounds and the level 0 size. Missing bounds leave that axis
/// unscaled. Results are truncated and clamped to at least one pixel.
///
/// # Errors
///
/// Returns [`DeepZoomError::InvalidSlide`] if the slide cannot describe one of
/// the levels it reports.
pub fn resolve_level_dimensions<S: SlideReader + ?Sized>(
    slide: &S,
    limit_bounds: bool,
) -> Result<Vec<(u32, u32)>, DeepZoomError> {
    let level_count = slide.level_count();
    let dimensions = (0..level_count)
        .map(|level| {
            slide
                .level_dimensions(level)
                .ok_or_else(|| DeepZoomError::InvalidSlide {
                    reason: format!("level {level} of {level_count} has no dimensions"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(&(base_width, base_height)) = dimensions.first() else {
        return Ok(dimensions);
    };
    if !limit_bounds {
        return Ok(dimensions);
    }

    let ratio = |property: &str, base: u32| -> f64 {
        match integer_property(slide, property) {
            Some(bound) if bound > 0 => bound as f64 / base as f64,
            Some(bound) => {
                warn!(property, bound, "Ignoring non-positive bounds size");
                1.0
            }
            None => 1.0,
        }
    };
    let x_ratio = ratio(PROPERTY_BOUNDS_WIDTH, base_width);
    let y_ratio = ratio(PROPERTY_BOUNDS_HEIGHT, base_height);

    Ok(dimensions
        .into_iter()
        .map(|(width, height)| (scale(width, x_ratio), scale(height, y_ratio)))
        .collect())
}

fn scale(value: u32, ratio: f64) -> u32 {
    ((value as f64 * ratio) as u32).max(1)
}

/// Offset of the active area in level 0 pixels.
///
/// Zero unless `limit_bounds` is set; absent bounds properties count as zero.
pub fn level0_offset<S: SlideReader + ?Sized>(slide: &S, limit_bounds: bool) -> (i64, i64) {
    if !limit_bounds {
        return (0, 0);
    }

    (
        integer_property(slide, PROPERTY_BOUNDS_X).unwrap_or(0),
        integer_property(slide, PROPERTY_BOUNDS_Y).unwrap_or(0),
    )
}

/// Deep Zoom level dimensions, coarsest first.
///
/// The chain is built from the base by halving (rounding up) until both axes
/// reach one pixel; that terminal tier is included.
pub fn deep_zoom_levels(base: (u32, u32)) -> Vec<(u32, u32)> {
    let mut size = (base.0.max(1), base.1.max(1));
    let mut levels = vec![size];

    while size.0 > 1 || size.1 > 1 {
        size = (size.0.div_ceil(2).max(1), size.1.div_ceil(2).max(1));
        levels.push(size);
    }

    levels.reverse();
    levels
}

/// Number of tiles needed to cover `extent` pixels.
#[inline]
pub fn tile_count(tile_size: u32, extent: u32) -> u32 {
    extent.div_ceil(tile_size)
}

/// Tile grid `(cols, rows)` for every level.
///
/// Overlap never changes the grid; it only pads individual tiles.
pub fn deep_zoom_tile_levels(tile_size: u32, levels: &[(u32, u32)]) -> Vec<(u32, u32)> {
    levels
        .iter()
        .map(|&(width, height)| (tile_count(tile_size, width), tile_count(tile_size, height)))
        .collect()
}
