//! SlideReader trait for format-agnostic slide access.
//!
//! This module defines the `SlideReader` trait, the contract the Deep Zoom
//! engine expects from whatever decodes the underlying slide. The engine only
//! reads metadata through it during construction and delegates pixel reads to
//! it when a tile is rendered.
//!
//! # Region Contract
//!
//! [`SlideReader::read_region`] mirrors the OpenSlide convention:
//! - `location` is the top-left corner in **level 0** coordinates
//! - `level` selects the native level to sample from
//! - `size` is the extent in pixels **of that level**
//!
//! The returned buffer holds `width * height` premultiplied ARGB samples, each a
//! `u32` in the platform's native byte order. Pixels outside the slide are fully
//! transparent.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::SlideError;

// =============================================================================
// Native Level
// =============================================================================

/// One resolution tier stored natively in the slide.
///
/// Level 0 is the full-resolution image; higher indices are progressively
/// smaller, with non-decreasing downsample factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NativeLevel {
    /// Index of this level (0 = highest resolution)
    pub index: usize,

    /// Width of this level in pixels
    pub width: u32,

    /// Height of this level in pixels
    pub height: u32,

    /// Downsample factor relative to level 0
    pub downsample: f64,
}

impl NativeLevel {
    /// Dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

// =============================================================================
// SlideReader Trait
// =============================================================================

/// Format-agnostic interface to a multi-resolution slide.
///
/// Implementations must be safe to share between tasks; the engine holds the
/// reader behind an `Arc` and never serialises calls to it.
#[async_trait]
pub trait SlideReader: Send + Sync {
    /// Get the number of native levels.
    fn level_count(&self) -> usize;

    /// Get dimensions of a specific level.
    ///
    /// Returns `(width, height)` in pixels, or `None` if level is out of range.
    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)>;

    /// Get the downsample factor for a level.
    ///
    /// Level 0 always has downsample 1.0. Returns `None` if level is out of range.
    fn level_downsample(&self, level: usize) -> Option<f64>;

    /// Look up a named slide property.
    fn property(&self, name: &str) -> Option<String>;

    /// Read a region of pixels.
    ///
    /// See the module documentation for coordinate conventions and the layout
    /// of the returned samples.
    async fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<Bytes, SlideError>;

    /// Get dimensions of the full-resolution (level 0) image.
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.level_dimensions(0)
    }

    /// Get complete information about a level.
    fn native_level(&self, level: usize) -> Option<NativeLevel> {
        let (width, height) = self.level_dimensions(level)?;
        let downsample = self.level_downsample(level)?;

        Some(NativeLevel {
            index: level,
            width,
            height,
            downsample,
        })
    }

    /// Look up a property, falling back to `default` when it is absent or empty.
    fn property_or(&self, name: &str, default: &str) -> String {
        match self.property(name) {
            Some(value) if !value.is_empty() => value,
            _ => default.to_string(),
        }
    }

    /// Find the best native level for a given downsample factor.
    ///
    /// Returns the coarsest level whose downsample does not exceed `downsample`,
    /// or level 0 if none qualifies. Downsamples are assumed monotone, so the
    /// result is monotone in `downsample`.
    fn best_level_for_downsample(&self, downsample: f64) -> usize {
        let mut best = 0;
        for level in 1..self.level_count() {
            match self.level_downsample(level) {
                Some(level_downsample) if level_downsample <= downsample => best = level,
                _ => break,
            }
        }
        best
    }
}

// =============================================================================
// Tests
// =============================================================================
