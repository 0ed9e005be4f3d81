//! Lazy, cancellable enumeration of every tile in a pyramid.
//!
//! A background task walks the pyramid (level, then row, then column) and
//! hands tiles one at a time through a single-slot channel. The consumer pulls
//! them with [`TileStream::next`]. Cancellation is cooperative: the producer
//! checks the signal before each tile and the stream stops yielding as soon as
//! it observes it.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::error::DeepZoomError;

use super::layout::{DeepZoomLayout, Tile};

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation signal shared between a caller and its streams.
///
/// Cloning yields another handle to the same signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Create a fresh, uncancelled signal.
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Wait until cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        // The sender lives as long as `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tile Stream
// =============================================================================

/// Consumer end of a tile enumeration.
///
/// Every element is a `Result`: a tile whose geometry cannot be resolved is
/// reported rather than skipped. The stream is finite and not restartable;
/// dropping it stops the producer.
#[derive(Debug)]
pub struct TileStream {
    rx: mpsc::Receiver<Result<Tile, DeepZoomError>>,
    cancel: CancelHandle,
}

impl TileStream {
    /// Start enumerating `layout` on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn(layout: Arc<DeepZoomLayout>, cancel: CancelHandle) -> Self {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(produce(layout, tx, cancel.clone()));
        Self { rx, cancel }
    }

    /// Next tile, or `None` once the pyramid is exhausted or cancelled.
    pub async fn next(&mut self) -> Option<Result<Tile, DeepZoomError>> {
        if self.cancel.is_cancelled() {
            self.rx.close();
            return None;
        }

        let item = self.rx.recv().await?;
        if self.cancel.is_cancelled() {
            self.rx.close();
            return None;
        }
        Some(item)
    }

    /// Stop the enumeration. No further tiles are yielded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle to this stream's cancellation signal.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

async fn produce(
    layout: Arc<DeepZoomLayout>,
    tx: mpsc::Sender<Result<Tile, DeepZoomError>>,
    cancel: CancelHandle,
) {
    debug!(tiles = layout.tile_count(), "Tile enumeration started");
    let mut emitted: u64 = 0;

    'levels: for (level, &(cols, rows)) in layout.level_tiles().iter().enumerate() {
        for row in 0..rows {
            for col in 0..cols {
                if cancel.is_cancelled() {
                    break 'levels;
                }

                let item = layout.tile(level, col, row);
                let delivered = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    sent = tx.send(item) => sent.is_ok(),
                };
                if !delivered {
                    break 'levels;
                }
                emitted += 1;
            }
        }
    }

    debug!(
        emitted,
        cancelled = cancel.is_cancelled(),
        "Tile enumeration finished"
    );
}
