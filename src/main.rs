//! wsi-deepzoom - Deep Zoom pyramid tools for Whole Slide Images.
//!
//! This binary inspects and renders the Deep Zoom pyramid of a synthetic slide.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_deepzoom::{
    config::{Cli, Command, DziConfig, GenerateConfig, InfoConfig, PyramidArgs},
    deepzoom::{dzi_tile_path, CancelHandle, DeepZoomGenerator, LevelDownsample},
    slide::SyntheticSlide,
    DEFAULT_TILE_FORMAT,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Info(config) => run_info(config).await,
        Command::Dzi(config) => run_dzi(config),
        Command::Generate(config) => run_generate(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_deepzoom=debug"
    } else {
        "wsi_deepzoom=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the generator for a validated set of pyramid arguments.
fn build_generator(args: &PyramidArgs) -> Option<DeepZoomGenerator<SyntheticSlide>> {
    match DeepZoomGenerator::new(args.to_slide(), args.tile_size, args.overlap, args.limit_bounds)
    {
        Ok(generator) => Some(generator),
        Err(e) => {
            error!("Failed to build pyramid: {}", e);
            None
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> bool {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };

    match encoded {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            false
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

/// JSON summary of a pyramid.
#[derive(Serialize)]
struct PyramidSummary<'a> {
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    level0_offset: (i64, i64),
    level_count: usize,
    tile_count: u64,
    levels: Vec<LevelSummary<'a>>,
}

#[derive(Serialize)]
struct LevelSummary<'a> {
    level: usize,
    width: u32,
    height: u32,
    cols: u32,
    rows: u32,
    #[serde(flatten)]
    native: &'a LevelDownsample,
}

async fn run_info(config: InfoConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    let Some(generator) = build_generator(&config.pyramid) else {
        return ExitCode::FAILURE;
    };
    let layout = generator.layout();

    let (width, height) = layout.dimensions();
    let levels = layout
        .level_dimensions()
        .iter()
        .zip(layout.level_tiles())
        .zip(layout.downsamples())
        .enumerate()
        .map(|(level, ((&(width, height), &(cols, rows)), native))| LevelSummary {
            level,
            width,
            height,
            cols,
            rows,
            native,
        })
        .collect();

    let summary = PyramidSummary {
        width,
        height,
        tile_size: layout.tile_size(),
        overlap: layout.overlap(),
        level0_offset: layout.level0_offset(),
        level_count: layout.level_count(),
        tile_count: layout.tile_count(),
        levels,
    };
    if !print_json(&summary, true) {
        return ExitCode::FAILURE;
    }

    if config.tiles {
        let mut tiles = generator.tiles();
        while let Some(tile) = tiles.next().await {
            match tile {
                Ok(tile) => {
                    if !print_json(&tile, false) {
                        return ExitCode::FAILURE;
                    }
                }
                Err(e) => {
                    error!("Failed to resolve tile: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// DZI Command
// =============================================================================

fn run_dzi(config: DziConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    let Some(generator) = build_generator(&config.pyramid) else {
        return ExitCode::FAILURE;
    };

    println!("{}", generator.dzi(&config.format));
    ExitCode::SUCCESS
}

// =============================================================================
// Generate Command
// =============================================================================

async fn run_generate(config: GenerateConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    let Some(generator) = build_generator(&config.pyramid) else {
        return ExitCode::FAILURE;
    };

    let tiles_dir = config.tiles_dir();
    let (width, height) = generator.layout().dimensions();
    info!("Configuration:");
    info!("  Dimensions: {}x{}", width, height);
    info!(
        "  Tiles: {} across {} levels ({}px, overlap {})",
        generator.tile_count(),
        generator.level_count(),
        config.pyramid.tile_size,
        config.pyramid.overlap
    );
    info!("  JPEG quality: {}", config.quality);
    info!("  Output: {}", tiles_dir.display());

    for level in 0..generator.level_count() {
        let dir = tiles_dir.join(level.to_string());
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            error!("Failed to create {}: {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let cancel = CancelHandle::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current tile");
                cancel.cancel();
            }
        });
    }

    let mut tiles = generator.tiles_with_cancel(cancel.clone());
    let mut written: u64 = 0;
    while let Some(tile) = tiles.next().await {
        let tile = match tile {
            Ok(tile) => tile,
            Err(e) => {
                error!("Failed to resolve tile: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let jpeg = match generator.tile_jpeg(&tile, config.quality).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                error!(
                    "Failed to render tile {}/{}_{}: {}",
                    tile.level, tile.col, tile.row, e
                );
                return ExitCode::FAILURE;
            }
        };

        let path = tiles_dir.join(dzi_tile_path(
            tile.level,
            tile.col,
            tile.row,
            DEFAULT_TILE_FORMAT,
        ));
        if let Err(e) = tokio::fs::write(&path, &jpeg).await {
            error!("Failed to write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }

        written += 1;
        debug!(path = %path.display(), bytes = jpeg.len(), "Wrote tile");
    }

    if cancel.is_cancelled() {
        warn!("Cancelled after {} of {} tiles", written, generator.tile_count());
        return ExitCode::FAILURE;
    }

    let dzi_path = config.dzi_path();
    if let Err(e) = tokio::fs::write(&dzi_path, generator.dzi(DEFAULT_TILE_FORMAT)).await {
        error!("Failed to write {}: {}", dzi_path.display(), e);
        return ExitCode::FAILURE;
    }

    info!("Wrote {} tiles and {}", written, dzi_path.display());
    ExitCode::SUCCESS
}
