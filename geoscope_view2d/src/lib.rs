// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope View 2D: view state and the geometry between screen and raster.
//!
//! This crate provides small, headless models for looking at one large raster
//! through a screen. It focuses on:
//! - View state ([`ViewState`]): scale, translation, and rotation of the
//!   content canvas, plus the pyramid level and window currently decoded.
//! - Coordinate conversion ([`transform`]) between screen, content-local,
//!   image-pixel, projected, and geographic coordinates.
//! - Fit-to-frame ([`fit`]): aspect-preserving fits and geo-registered
//!   margins inside a shared canvas.
//!
//! It does **not** decode pixels or draw anything. Controllers are expected
//! to own a raster source and a rendering surface and to drive this crate
//! from input events.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use geoscope_geo::ImageMetadata;
//! use geoscope_view2d::{ViewState, fit, transform};
//!
//! let screen = Size::new(800.0, 600.0);
//! let mut meta = ImageMetadata::new("scene.tif", 10_000, 8_000);
//!
//! let outcome = fit::fit_to_screen(&meta, None, screen).unwrap();
//! outcome.apply_to(&mut meta);
//! assert_eq!(meta.viewer_size(), Size::new(750.0, 600.0));
//!
//! let mut view = ViewState::new();
//! view.set_translation(fit::center_in_screen(outcome.canvas_size, screen));
//!
//! // The screen center is the raster center.
//! let p = transform::screen_to_image(Point::new(400.0, 300.0), &view, &meta).unwrap();
//! assert!((p.x - 5_000.0).abs() < 1e-9 && (p.y - 4_000.0).abs() < 1e-9);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

pub mod fit;
pub mod transform;
mod view_state;

pub use fit::{FitError, FitOutcome};
pub use transform::TransformError;
pub use view_state::{ViewState, ViewStateDebugInfo};
