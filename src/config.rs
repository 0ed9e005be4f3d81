//! Configuration for the `wsi-deepzoom` command line tool.
//!
//! Options can be given as command-line arguments or environment variables
//! with the `DZ_` prefix. Every command works on a synthetic slide described
//! by [`PyramidArgs`], so the pyramid geometry can be inspected without a
//! slide decoder.
//!
//! # Environment Variables
//!
//! - `DZ_LEVELS` - Native level dimensions, finest first (default: 46920x33600,11730x8400,2932x2100)
//! - `DZ_TILE_SIZE` - Tile edge length (default: 254)
//! - `DZ_OVERLAP` - Overlap on interior tile edges (default: 1)
//! - `DZ_LIMIT_BOUNDS` - Restrict the pyramid to the declared bounds
//! - `DZ_BOUNDS_X`, `DZ_BOUNDS_Y`, `DZ_BOUNDS_WIDTH`, `DZ_BOUNDS_HEIGHT` - Declared bounds
//! - `DZ_BACKGROUND` - Background colour as `RRGGBB`
//! - `DZ_OUTPUT` - Output directory for `generate` (default: .)
//! - `DZ_NAME` - Pyramid name for `generate` (default: slide)
//! - `DZ_QUALITY` - JPEG quality for `generate` (default: 80)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::deepzoom::{DEFAULT_OVERLAP, DEFAULT_TILE_SIZE};
use crate::slide::properties::parse_hex_color;
use crate::slide::SyntheticSlide;
use crate::tile::{is_valid_quality, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default native level dimensions of the synthetic slide.
pub const DEFAULT_LEVELS: &[&str] = &["46920x33600", "11730x8400", "2932x2100"];

/// Default pyramid name.
pub const DEFAULT_NAME: &str = "slide";

/// Largest accepted tile edge length.
pub const MAX_TILE_SIZE: u32 = 8192;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Deep Zoom pyramid tools for Whole Slide Images.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-deepzoom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the pyramid geometry as JSON.
    Info(InfoConfig),

    /// Print the DZI descriptor.
    Dzi(DziConfig),

    /// Render every tile to disk in the Deep Zoom directory layout.
    Generate(GenerateConfig),
}

/// Description of the synthetic slide and pyramid parameters.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct PyramidArgs {
    /// Native level dimensions, finest first (`WxH,WxH,...`).
    #[arg(
        long,
        default_values = DEFAULT_LEVELS,
        env = "DZ_LEVELS",
        value_parser = parse_dimensions,
        value_delimiter = ','
    )]
    pub levels: Vec<(u32, u32)>,

    /// Tile edge length in pixels, excluding overlap.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "DZ_TILE_SIZE")]
    pub tile_size: u32,

    /// Extra pixels added to interior tile edges.
    #[arg(long, default_value_t = DEFAULT_OVERLAP, env = "DZ_OVERLAP")]
    pub overlap: u32,

    /// Restrict the pyramid to the declared bounds.
    #[arg(long, default_value_t = false, env = "DZ_LIMIT_BOUNDS")]
    pub limit_bounds: bool,

    /// X offset of the non-empty region, in level 0 pixels.
    #[arg(long, env = "DZ_BOUNDS_X")]
    pub bounds_x: Option<i64>,

    /// Y offset of the non-empty region, in level 0 pixels.
    #[arg(long, env = "DZ_BOUNDS_Y")]
    pub bounds_y: Option<i64>,

    /// Width of the non-empty region, in level 0 pixels.
    #[arg(long, env = "DZ_BOUNDS_WIDTH")]
    pub bounds_width: Option<u32>,

    /// Height of the non-empty region, in level 0 pixels.
    #[arg(long, env = "DZ_BOUNDS_HEIGHT")]
    pub bounds_height: Option<u32>,

    /// Background colour as a `RRGGBB` hex triplet.
    #[arg(long, env = "DZ_BACKGROUND")]
    pub background: Option<String>,
}

impl PyramidArgs {
    /// Validate the pyramid parameters and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let Some(&(width, height)) = self.levels.first() else {
            return Err("At least one level is required. Set --levels or DZ_LEVELS".to_string());
        };
        if width == 0 || height == 0 {
            return Err(format!("Level 0 must not be empty, got {width}x{height}"));
        }
        for pair in self.levels.windows(2) {
            if pair[1].0 > pair[0].0 || pair[1].1 > pair[0].1 {
                return Err(format!(
                    "Levels must be ordered finest first: {}x{} follows {}x{}",
                    pair[1].0, pair[1].1, pair[0].0, pair[0].1
                ));
            }
            if pair[1].0 == 0 || pair[1].1 == 0 {
                return Err("Levels must not be empty".to_string());
            }
        }

        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(format!("tile_size must be between 1 and {MAX_TILE_SIZE}"));
        }
        if self.overlap >= self.tile_size {
            return Err("overlap must be smaller than tile_size".to_string());
        }

        if let Some(ref background) = self.background {
            if parse_hex_color(background).is_none() {
                return Err(format!("Invalid background colour '{background}', expected RRGGBB"));
            }
        }

        Ok(())
    }

    /// Build the synthetic slide these arguments describe.
    pub fn to_slide(&self) -> SyntheticSlide {
        let mut slide = SyntheticSlide::new(self.levels.iter().copied());

        let has_bounds = self.bounds_x.is_some()
            || self.bounds_y.is_some()
            || self.bounds_width.is_some()
            || self.bounds_height.is_some();
        if has_bounds {
            slide = slide.with_bounds(
                self.bounds_x.unwrap_or(0),
                self.bounds_y.unwrap_or(0),
                self.bounds_width,
                self.bounds_height,
            );
        }
        if let Some(ref background) = self.background {
            slide = slide.with_background(background.clone());
        }

        slide
    }
}

/// Configuration for the `info` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct InfoConfig {
    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Also print one JSON line per tile.
    #[arg(long, default_value_t = false)]
    pub tiles: bool,
}

impl InfoConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid.validate()
    }
}

/// Configuration for the `dzi` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DziConfig {
    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Tile image format written into the descriptor.
    #[arg(long, default_value = crate::deepzoom::DEFAULT_TILE_FORMAT)]
    pub format: String,
}

impl DziConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid.validate()?;
        if self.format.is_empty() || !self.format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("Invalid tile format '{}'", self.format));
        }
        Ok(())
    }
}

/// Configuration for the `generate` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    #[command(flatten)]
    pub pyramid: PyramidArgs,

    /// Directory the pyramid is written to.
    #[arg(short, long, default_value = ".", env = "DZ_OUTPUT")]
    pub output: PathBuf,

    /// Pyramid name, used for `<name>.dzi` and `<name>_files/`.
    #[arg(long, default_value = DEFAULT_NAME, env = "DZ_NAME")]
    pub name: String,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "DZ_QUALITY")]
    pub quality: u8,
}

impl GenerateConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.pyramid.validate()?;

        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        if self.name.is_empty() || self.name.contains(['/', '\\']) {
            return Err(format!("Invalid pyramid name '{}'", self.name));
        }

        Ok(())
    }

    /// Path of the DZI descriptor.
    pub fn dzi_path(&self) -> PathBuf {
        self.output.join(format!("{}.dzi", self.name))
    }

    /// Directory holding the per-level tile folders.
    pub fn tiles_dir(&self) -> PathBuf {
        self.output.join(format!("{}_files", self.name))
    }
}

/// Parse a `WxH` dimension pair.
pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension '{part}' in '{value}': {e}"))
    };
    Ok((parse(width)?, parse(height)?))
}

// =============================================================================
// Tests
// =============================================================================
