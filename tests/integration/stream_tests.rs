//! Tile enumeration integration tests.
//!
//! Tests verify:
//! - Every tile is produced once, in level/row/column order
//! - Streamed tiles match direct lookups
//! - Cancellation through a shared handle stops the stream
//! - Streams can be rendered while they are consumed

use std::collections::HashSet;

use wsi_deepzoom::{CancelHandle, DeepZoomGenerator, SyntheticSlide};

use super::test_utils::{three_level_slide, RecordingSlide};

#[tokio::test]
async fn test_stream_covers_pyramid_once() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut tiles = generator.tiles();
    while let Some(tile) = tiles.next().await {
        let tile = tile.unwrap();
        assert_eq!(tile, generator.tile(tile.level, tile.col, tile.row).unwrap());
        assert!(seen.insert((tile.level, tile.col, tile.row)));
        order.push((tile.level, tile.row, tile.col));
    }

    assert_eq!(seen.len() as u64, generator.tile_count());
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_independent_streams() {
    let generator =
        DeepZoomGenerator::new(SyntheticSlide::new([(1000, 1000)]), 512, 0, false).unwrap();

    let mut first = generator.tiles();
    let mut second = generator.tiles();

    first.cancel();
    assert!(first.next().await.is_none());

    let mut count = 0;
    while let Some(tile) = second.next().await {
        tile.unwrap();
        count += 1;
    }
    assert_eq!(count, 14);
}

#[tokio::test]
async fn test_shared_handle_cancels_from_another_task() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();
    let cancel = CancelHandle::new();
    let mut tiles = generator.tiles_with_cancel(cancel.clone());

    assert!(tiles.next().await.is_some());
    assert!(tiles.next().await.is_some());

    tokio::spawn(async move { cancel.cancel() }).await.unwrap();

    assert!(tiles.cancel_handle().is_cancelled());
    assert!(tiles.next().await.is_none());
}

#[tokio::test]
async fn test_dropping_stream_early() {
    let generator = DeepZoomGenerator::new(three_level_slide(), 254, 1, false).unwrap();

    {
        let mut tiles = generator.tiles();
        assert!(tiles.next().await.is_some());
    }

    // The generator stays usable after a stream is abandoned
    let mut tiles = generator.tiles();
    let first = tiles.next().await.unwrap().unwrap();
    assert_eq!((first.level, first.col, first.row), (0, 0, 0));
}

#[tokio::test]
async fn test_render_while_streaming() {
    let slide = RecordingSlide::new(SyntheticSlide::new([(600, 300)]));
    let generator = DeepZoomGenerator::new(slide, 256, 1, false).unwrap();

    let mut tiles = generator.tiles();
    let mut rendered = 0;
    while let Some(tile) = tiles.next().await {
        let tile = tile.unwrap();
        let jpeg = generator.tile_jpeg(&tile, 60).await.unwrap();
        assert!(!jpeg.is_empty());
        rendered += 1;
    }

    assert_eq!(rendered as u64, generator.tile_count());
    assert_eq!(generator.slide().request_count(), rendered);
}
