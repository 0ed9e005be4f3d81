//! Pyramid geometry integration tests.
//!
//! Tests verify:
//! - Level chain and tile grids for common slide shapes
//! - Native level selection across multi-level slides
//! - Tile address validation
//! - Bounds-restricted pyramids

use wsi_deepzoom::{DeepZoomError, DeepZoomGenerator, SlideReader, SyntheticSlide};

use super::test_utils::{three_level_slide, RecordingSlide};

// =============================================================================
// Level Chain
// =============================================================================

#[test]
fn test_square_slide_pyramid() {
    let generator =
        DeepZoomGenerator::new(SyntheticSlide::new([(1000, 1000)]), 512, 0, false).unwrap();

    assert_eq!(generator.level_count(), 11);
    assert_eq!(generator.level_dimensions()[0], (1, 1));
    assert_eq!(generator.level_dimensions()[6], (63, 63));
    assert_eq!(generator.level_dimensions()[10], (1000, 1000));

    let grids = generator.level_tiles();
    assert!(grids[..10].iter().all(|&grid| grid == (1, 1)));
    assert_eq!(grids[10], (2, 2));
}

#[test]
fn test_default_tile_size_grid() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    let last = generator.level_count() - 1;
    assert_eq!(generator.level_dimensions()[last], (4096, 3072));
    // ceil(4096 / 254) and ceil(3072 / 254)
    assert_eq!(generator.level_tiles()[last], (17, 13));
}

#[test]
fn test_level_dimensions_halve() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();
    let levels = generator.level_dimensions();

    for pair in levels.windows(2) {
        assert_eq!(pair[0].0, pair[1].0.div_ceil(2));
        assert_eq!(pair[0].1, pair[1].1.div_ceil(2));
    }
}

// =============================================================================
// Native Level Selection
// =============================================================================

#[test]
fn test_native_level_monotone() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    let mut previous = usize::MAX;
    for level in 0..generator.level_count() {
        let info = generator.tile_info(level, 0, 0).unwrap();
        assert!(info.slide_level <= previous, "level {level}");
        previous = info.slide_level;
    }

    let finest = generator.tile_info(generator.level_count() - 1, 0, 0).unwrap();
    assert_eq!(finest.slide_level, 0);
    let coarsest = generator.tile_info(0, 0, 0).unwrap();
    assert_eq!(coarsest.slide_level, 2);
}

#[test]
fn test_native_level_never_upsamples() {
    let slide = three_level_slide();
    let generator = DeepZoomGenerator::new(slide.clone(), 256, 0, false).unwrap();
    let count = generator.level_count();

    for level in 0..count {
        let info = generator.tile_info(level, 0, 0).unwrap();
        let native = slide.level_downsample(info.slide_level).unwrap();
        let desired = 2f64.powi((count - level - 1) as i32);
        assert!(native <= desired, "level {level}: {native} > {desired}");
    }
}

#[test]
fn test_source_covers_output() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    for (level, &(cols, rows)) in generator.level_tiles().iter().enumerate() {
        for (col, row) in [(0, 0), (cols - 1, rows - 1)] {
            let info = generator.tile_info(level, col, row).unwrap();
            assert!(info.output_size.0 >= 1 && info.output_size.1 >= 1);
            assert!(info.source_size.0 >= 1 && info.source_size.1 >= 1);
            assert!(info.output_size.0 <= 254 + 2);
            assert!(info.output_size.1 <= 254 + 2);
        }
    }
}

// =============================================================================
// Address Validation
// =============================================================================

#[test]
fn test_level_equal_to_count_rejected() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();
    let level_count = generator.level_count();

    let err = generator.tile_info(level_count, 0, 0).unwrap_err();
    assert_eq!(
        err,
        DeepZoomError::InvalidLevel {
            level: level_count,
            level_count
        }
    );
    assert!(generator.tile_info(level_count - 1, 0, 0).is_ok());
}

#[test]
fn test_out_of_grid_addresses_rejected() {
    let generator =
        DeepZoomGenerator::new(SyntheticSlide::new([(1000, 1000)]), 512, 0, false).unwrap();

    for (col, row) in [(-1, 0), (0, -1), (2, 0), (0, 2), (i64::MAX, 0)] {
        assert!(
            matches!(
                generator.tile_info(10, col, row),
                Err(DeepZoomError::InvalidAddress { level: 10, .. })
            ),
            "({col}, {row})"
        );
    }
    assert!(generator.tile(10, 1, 1).is_ok());
}

#[test]
fn test_geometry_never_reads_pixels() {
    let slide = RecordingSlide::new(three_level_slide());
    let generator = DeepZoomGenerator::new(slide, 254, 1, false).unwrap();

    for level in 0..generator.level_count() {
        generator.tile_info(level, 0, 0).unwrap();
    }
    generator.dzi("jpeg");

    assert_eq!(generator.slide().request_count(), 0);
}

// =============================================================================
// Bounds
// =============================================================================

#[test]
fn test_limit_bounds_restricts_pyramid() {
    let slide = three_level_slide().with_bounds(1024, 512, Some(2048), Some(1536));

    let full = DeepZoomGenerator::new(slide.clone(), 256, 0, false).unwrap();
    assert_eq!(full.level_dimensions().last(), Some(&(4096, 3072)));

    let bounded = DeepZoomGenerator::new(slide, 256, 0, true).unwrap();
    assert_eq!(bounded.level_dimensions().last(), Some(&(2048, 1536)));
    assert_eq!(bounded.layout().level0_offset(), (1024, 512));
    assert_eq!(
        bounded.layout().slide_level_dimensions(),
        &[(2048, 1536), (512, 384), (128, 96)]
    );

    let last = bounded.level_count() - 1;
    let info = bounded.tile_info(last, 1, 2).unwrap();
    assert_eq!(info.source_location, (1024 + 256, 512 + 512));
}

#[test]
fn test_limit_bounds_without_properties() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 256, 0, true).unwrap();

    assert_eq!(generator.level_dimensions().last(), Some(&(4096, 3072)));
    assert_eq!(generator.layout().level0_offset(), (0, 0));
}
