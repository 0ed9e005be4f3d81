//! Test utilities for integration tests.
//!
//! This module provides slide readers that record or sabotage region reads,
//! wrapping the library's synthetic slide for pixel data.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use wsi_deepzoom::error::SlideError;
use wsi_deepzoom::slide::{SlideReader, SyntheticSlide};

/// One recorded `read_region` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRequest {
    pub location: (i64, i64),
    pub level: usize,
    pub size: (u32, u32),
}

// =============================================================================
// Recording Slide
// =============================================================================

/// A slide that records every region request before delegating to a
/// synthetic slide.
pub struct RecordingSlide {
    inner: SyntheticSlide,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<RegionRequest>>>,
}

impl RecordingSlide {
    pub fn new(inner: SyntheticSlide) -> Self {
        Self {
            inner,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn inner(&self) -> &SyntheticSlide {
        &self.inner
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<RegionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl SlideReader for RecordingSlide {
    fn level_count(&self) -> usize {
        self.inner.level_count()
    }

    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
        self.inner.level_dimensions(level)
    }

    fn level_downsample(&self, level: usize) -> Option<f64> {
        self.inner.level_downsample(level)
    }

    fn property(&self, name: &str) -> Option<String> {
        self.inner.property(name)
    }

    async fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<Bytes, SlideError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push(RegionRequest {
            location,
            level,
            size,
        });
        self.inner.read_region(location, level, size).await
    }
}

// =============================================================================
// Faulty Slides
// =============================================================================

/// How a [`FaultySlide`] misbehaves on `read_region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every read fails with a decoder error
    ReadError,
    /// Reads return one sample too few
    ShortBuffer,
}

/// A slide with valid metadata whose pixel reads misbehave.
pub struct FaultySlide {
    inner: SyntheticSlide,
    fault: Fault,
}

impl FaultySlide {
    pub fn new(inner: SyntheticSlide, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

#[async_trait]
impl SlideReader for FaultySlide {
    fn level_count(&self) -> usize {
        self.inner.level_count()
    }

    fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
        self.inner.level_dimensions(level)
    }

    fn level_downsample(&self, level: usize) -> Option<f64> {
        self.inner.level_downsample(level)
    }

    fn property(&self, name: &str) -> Option<String> {
        self.inner.property(name)
    }

    async fn read_region(
        &self,
        location: (i64, i64),
        level: usize,
        size: (u32, u32),
    ) -> Result<Bytes, SlideError> {
        match self.fault {
            Fault::ReadError => Err(SlideError::Read(format!(
                "corrupt tile at ({}, {}) on level {}",
                location.0, location.1, level
            ))),
            Fault::ShortBuffer => {
                let data = self.inner.read_region(location, level, size).await?;
                Ok(data.slice(..data.len().saturating_sub(4)))
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// A three-level slide with 4x steps between native levels.
pub fn three_level_slide() -> SyntheticSlide {
    SyntheticSlide::new([(4096, 3072), (1024, 768), (256, 192)])
}
