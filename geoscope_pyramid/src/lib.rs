// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope Pyramid: resolution levels and decode windows for large rasters.
//!
//! Large imagery is stored with precomputed overviews: copies of the raster
//! downsampled by fixed factors (2, 4, 8, 16, ...). Decoding an overview
//! instead of the full-resolution data bounds the cost of showing a
//! zoomed-out view. This crate models:
//! - [`PyramidLevel`] / [`PyramidLevels`]: the declared levels of a raster.
//! - [`RasterWindow`]: an integer pixel window in full-resolution space.
//! - [`RasterWindowRequest`]: a window plus the level to read it from.
//! - [`LevelPolicy`]: the level selector.
//!
//! It does not read pixels. Raster sources consume [`RasterWindowRequest`]s
//! and viewport controllers produce them.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use geoscope_pyramid::{LevelPolicy, PyramidLevels, RasterWindow};
//!
//! let levels = PyramidLevels::default();
//!
//! // The part of a 20000x16000 raster visible after zooming in a little.
//! let visible = Rect::new(2_500.3, 1_800.9, 14_100.0, 10_600.2);
//! let window = RasterWindow::from_image_rect(visible, 20_000, 16_000).unwrap();
//!
//! let request = LevelPolicy::default().request(&levels, window, Size::new(1280.0, 960.0));
//! assert_eq!(request.level.factor(), 8);
//! assert_eq!(request.decoded_size(), (1451, 1101));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod levels;
mod policy;
mod window;

pub use levels::{PyramidLevel, PyramidLevels};
pub use policy::LevelPolicy;
pub use window::{RasterWindow, RasterWindowRequest};
