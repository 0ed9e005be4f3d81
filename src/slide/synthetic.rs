//! In-memory slide that renders a deterministic test pattern.
//!
//! `SyntheticSlide` implements [`SlideReader`] without decoding any file: each
//! pixel is a pure function of its level 0 coordinate. It backs the command
//! line tool and the test suites, and is a convenient reference for what a
//! real decoder must return from [`SlideReader::read_region`].

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use image::Rgba;

use crate::error::SlideError;

use super::properties::{
    PROPERTY_BACKGROUND_COLOR, PROPERTY_BOUNDS_HEIGHT, PROPERTY_BOUNDS_WIDTH, PROPERTY_BOUNDS_X,
    PROPERTY_BOUNDS_Y,
};
use super::reader::{NativeLevel, SlideReader};

/// Edge length of the checkerboard cells, in level 0 pixels.
pub const DEFAULT_CELL_SIZE: u32 = 256;

/// A slide whose pixels are generated on demand.
#[derive(Debug, Clone)]
pub struct SyntheticSlide {
    levels: Vec<NativeLevel>,
    properties: HashMap<String, String>,
    cell_size: u32,
}

impl SyntheticSlide {
    /// Create a slide from native level dimensions, finest first.
    ///
    /// Downsample factors are derived from the level 0 size, averaging the two
    /// axes the way pyramidal TIFF readers do.
    pub fn new(level_dimensions: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let dimensions: Vec<(u32, u32)> = level_dimensions.into_iter().collect();
        let (base_width, base_height) = dimensions.first().copied().unwrap_or((0, 0));

        let levels = dimensions
            .iter()
            .enumerate()
            .map(|(index, &(width, height))| {
                let downsample = if index == 0 {
                    1.0
                } else {
                    let downsample_x = base_width as f64 / width as f64;
                    let downsample_y = base_height as f64 / height as f64;
                    (downsample_x + downsample_y) / 2.0
                };
                NativeLevel {
                    index,
                    width,
                    height,
                    downsample,
                }
            })
            .collect();

        Self {
            levels,
            properties: HashMap::new(),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }

    /// Set an arbitrary property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Declare the non-empty region of the slide.
    ///
    /// `width` and `height` are optional, as in real slides where only the
    /// offset may be recorded.
    pub fn with_bounds(mut self, x: i64, y: i64, width: Option<u32>, height: Option<u32>) -> Self {
        self = self
            .with_property(PROPERTY_BOUNDS_X, x.to_string())
            .with_property(PROPERTY_BOUNDS_Y, y.to_string());
        if let Some(width) = width {
            self = self.with_property(PROPERTY_BOUNDS_WIDTH, width.to_string());
        }
        if let Some(height) = height {
            self = self.with_property(PROPERTY_BOUNDS_HEIGHT, height.to_string());
        }
        self
    }

    /// Declare the background colour as a `RRGGBB` hex triplet.
    pub fn with_background(self, hex: impl Into<String>) -> Self {
        self.with_property(PROPERTY_BACKGROUND_COLOR, hex)
    }

    /// Change the checkerboard cell size (level 0 pixels, minimum 1).
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    /// Straight (non-premultiplied) colour of the level 0 pixel at `(x, y)`.
    ///
    /// Pixels outside the slide are fully transparent.
    pub fn sample_at(&self, x: i64, y: i64) -> Rgba<u8> {
        let Some(base) = self.levels.first() else {
            return Rgba([0, 0, 0, 0]);
        };
        if x < 0 || y < 0 || x >= base.width as i64 || y >= base.height as i64 {
            return Rgba([0, 0, 0, 0]);
        }

        let cell = self.cell_size as i64;
        let red = (x * 255 / base.width.max(1) as i64) as u8;
        let green = (y * 255 / base.height.max(1) as i64) as u8;
        let blue = if (x / cell + y / cell) % 2 == 0 { 224 } else { 32 };
        Rgba([red, green, blue, 255])
    }
}

#[async_trait]
impl SlideReader for SyntheticSlide {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
        self.levels.get(level).map(NativeLevel::dimensions)
    }

    fn level_downsample(&self, level: usize) -> Option<f64> {
        self.levels.get(level).map(|l| l.downsample)
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    async fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<Bytes, SlideError> {
        let native = self
            .levels
            .get(level)
            .ok_or(SlideError::LevelOutOfRange {
                level,
                level_count: self.levels.len(),
            })?;

        let (width, height) = size;
        let mut buf = BytesMut::with_capacity(width as usize * height as usize * 4);

        for y in 0..height {
            let base_y = location.1 + (y as f64 * native.downsample).floor() as i64;
            for x in 0..width {
                let base_x = location.0 + (x as f64 * native.downsample).floor() as i64;
                let Rgba([r, g, b, a]) = self.sample_at(base_x, base_y);
                // Premultiplied: transparent samples carry no colour.
                let argb = if a == 0 {
                    0
                } else {
                    u32::from_be_bytes([a, r, g, b])
                };
                buf.put_slice(&argb.to_ne_bytes());
            }
        }

        Ok(buf.freeze())
    }
}
