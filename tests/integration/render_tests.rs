//! Tile rendering integration tests.
//!
//! Tests verify:
//! - Region requests match the tile's mapped geometry
//! - Rendered and encoded tiles have the tile's output size
//! - Pixels come from the expected native level
//! - Slide failures surface unchanged, without retries

use std::sync::Arc;

use image::Rgba;
use wsi_deepzoom::{DeepZoomError, DeepZoomGenerator, JpegTileEncoder, SlideError, SyntheticSlide};

use super::test_utils::{three_level_slide, Fault, FaultySlide, RecordingSlide, RegionRequest};

// =============================================================================
// Region Requests
// =============================================================================

#[tokio::test]
async fn test_read_tile_requests_mapped_region() {
    let slide = RecordingSlide::new(three_level_slide());
    let generator = DeepZoomGenerator::new(slide, 254, 1, false).unwrap();

    let tiles = [
        generator.tile(0, 0, 0).unwrap(),
        generator.tile(9, 1, 1).unwrap(),
        generator.tile(12, 16, 12).unwrap(),
    ];
    for tile in &tiles {
        generator.read_tile(tile).await.unwrap();
    }

    let requests = generator.slide().get_requests().await;
    assert_eq!(generator.slide().request_count(), tiles.len());
    for (tile, request) in tiles.iter().zip(requests) {
        assert_eq!(
            request,
            RegionRequest {
                location: tile.info.source_location,
                level: tile.info.slide_level,
                size: tile.info.source_size,
            }
        );
    }
}

#[tokio::test]
async fn test_rendered_size_matches_output_size() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    for level in [0, 6, 10, 12] {
        let (cols, rows) = generator.level_tiles()[level];
        for (col, row) in [(0, 0), (cols - 1, rows - 1)] {
            let tile = generator.tile(level, col, row).unwrap();
            let image = generator.read_tile(&tile).await.unwrap();
            assert_eq!(image.dimensions(), tile.info.output_size, "{tile:?}");
        }
    }
}

#[tokio::test]
async fn test_jpeg_size_matches_output_size() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();
    let encoder = JpegTileEncoder::new();

    let last = generator.level_count() - 1;
    let tile = generator.tile(last, 16, 12).unwrap();
    let jpeg = generator.tile_jpeg(&tile, 75).await.unwrap();

    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(encoder.dimensions(&jpeg).unwrap(), tile.info.output_size);
}

// =============================================================================
// Pixel Content
// =============================================================================

#[tokio::test]
async fn test_pixels_from_native_level() {
    let slide =
        RecordingSlide::new(SyntheticSlide::new([(1024, 1024), (256, 256)]).with_cell_size(8));
    let generator = DeepZoomGenerator::new(slide, 256, 0, false).unwrap();

    // Deep Zoom level 8 is 256x256, served 1:1 from native level 1
    let tile = generator.tile(8, 0, 0).unwrap();
    assert_eq!(tile.info.slide_level, 1);
    assert_eq!(tile.info.source_size, tile.info.output_size);

    let image = generator.read_tile(&tile).await.unwrap();
    let reference = generator.slide().inner();
    assert_eq!(image.get_pixel(3, 5), &reference.sample_at(12, 20));
    assert_eq!(image.get_pixel(255, 255), &reference.sample_at(1020, 1020));
}

#[tokio::test]
async fn test_declared_background_fills_outside() {
    let slide = SyntheticSlide::new([(600, 400)])
        .with_bounds(0, 200, Some(600), Some(400))
        .with_background("203040");
    let generator = DeepZoomGenerator::new(slide, 1024, 0, true).unwrap();

    let last = generator.level_count() - 1;
    let tile = generator.tile(last, 0, 0).unwrap();
    let image = generator.read_tile(&tile).await.unwrap();

    assert_eq!(image.get_pixel(0, 0), &generator.slide().sample_at(0, 200));
    assert_eq!(image.get_pixel(0, 399), &Rgba([0x20, 0x30, 0x40, 255]));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_read_failure_propagates() {
    let slide = FaultySlide::new(three_level_slide(), Fault::ReadError);
    let generator = DeepZoomGenerator::new(slide, 254, 1, false).unwrap();

    let tile = generator.tile(12, 0, 0).unwrap();
    let err = generator.read_tile(&tile).await.unwrap_err();
    assert_eq!(
        err,
        DeepZoomError::SlideRead(SlideError::Read(
            "corrupt tile at (0, 0) on level 0".to_string()
        ))
    );

    let err = generator.tile_jpeg(&tile, 80).await.unwrap_err();
    assert!(matches!(err, DeepZoomError::SlideRead(_)));
}

#[tokio::test]
async fn test_short_buffer_is_render_error() {
    let slide = FaultySlide::new(three_level_slide(), Fault::ShortBuffer);
    let generator = DeepZoomGenerator::new(slide, 254, 1, false).unwrap();

    let tile = generator.tile(12, 1, 1).unwrap();
    let result = generator.read_tile(&tile).await;
    assert!(matches!(result, Err(DeepZoomError::Render { .. })));
}

#[tokio::test]
async fn test_concurrent_reads_share_generator() {
    let slide = RecordingSlide::new(three_level_slide());
    let generator = Arc::new(DeepZoomGenerator::new(slide, 254, 1, false).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|col| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                let tile = generator.tile(11, col, 0)?;
                let image = generator.read_tile(&tile).await?;
                Ok::<_, DeepZoomError>((tile, image))
            })
        })
        .collect();

    for handle in handles {
        let (tile, image) = handle.await.unwrap().unwrap();
        assert_eq!(image.dimensions(), tile.info.output_size);
    }
    assert_eq!(generator.slide().request_count(), 4);
}
