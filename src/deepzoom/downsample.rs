//! Native level selection for each Deep Zoom level.
//!
//! Deep Zoom levels follow a strict power-of-two schedule while slides only
//! store a handful of native levels. For every Deep Zoom level we pick the
//! native level to read from and record the residual downsample that still has
//! to be applied after reading it.

use serde::Serialize;

use crate::error::DeepZoomError;
use crate::slide::SlideReader;

/// Binding between one Deep Zoom level and the native level that backs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelDownsample {
    /// Native level to read from
    pub slide_level: usize,

    /// Downsample of the native level relative to level 0
    pub level_downsample: f64,

    /// Native (unrestricted) dimensions of the chosen level
    pub level_dimensions: (u32, u32),

    /// Extra shrink from the native level to the Deep Zoom level
    pub residual_downsample: f64,
}

/// Downsample from level 0 wanted at `dz_level` in a pyramid of `level_count` levels.
///
/// The finest level has downsample 1, each coarser level doubles it.
#[inline]
pub fn desired_downsample(dz_level: usize, level_count: usize) -> f64 {
    2f64.powi((level_count - dz_level - 1) as i32)
}

/// Select a native level for every Deep Zoom level, coarsest first.
///
/// # Errors
///
/// Returns [`DeepZoomError::InvalidSlide`] if the slide picks a native level it
/// cannot describe, or one with a non-positive downsample.
pub fn generate_downsamples<S: SlideReader + ?Sized>(
    slide: &S,
    level_count: usize,
) -> Result<Vec<LevelDownsample>, DeepZoomError> {
    (0..level_count)
        .map(|dz_level| {
            let desired = desired_downsample(dz_level, level_count);
            let slide_level = slide.best_level_for_downsample(desired);
            let native = slide
                .native_level(slide_level)
                .ok_or_else(|| DeepZoomError::InvalidSlide {
                    reason: format!(
                        "best level for downsample {desired} is {slide_level}, \
                         but the slide has {} levels",
                        slide.level_count()
                    ),
                })?;
            if native.downsample.is_nan() || native.downsample <= 0.0 {
                return Err(DeepZoomError::InvalidSlide {
                    reason: format!(
                        "level {slide_level} downsample must be positive, got {}",
                        native.downsample
                    ),
                });
            }

            Ok(LevelDownsample {
                slide_level,
                level_downsample: native.downsample,
                level_dimensions: native.dimensions(),
                residual_downsample: desired / native.downsample,
            })
        })
        .collect()
}
