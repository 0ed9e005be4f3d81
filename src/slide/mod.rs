//! Slide abstraction layer.
//!
//! This module defines the contract between the Deep Zoom engine and whatever
//! decodes the underlying Whole Slide Image.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DeepZoomGenerator             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           SlideReader Trait             │
//! │  (levels, downsamples, properties,      │
//! │   region reads)                         │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │ SyntheticSlide  │    │  external decoders  │
//! │ (test pattern)  │    │  (OpenSlide, ...)   │
//! └─────────────────┘    └─────────────────────┘
//! ```

pub mod properties;
mod reader;
mod synthetic;

pub use reader::{NativeLevel, SlideReader};
pub use synthetic::{SyntheticSlide, DEFAULT_CELL_SIZE};
