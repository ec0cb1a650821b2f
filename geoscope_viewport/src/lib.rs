// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope Viewport: an interactive view over one large raster.
//!
//! A [`ViewportController`] ties the pieces of Geoscope together:
//! - a [`RasterSource`](geoscope_source::RasterSource) supplies pixels and
//!   overviews,
//! - the fit engine in [`geoscope_view2d`] sizes and places the raster,
//! - [`geoscope_event_state`] turns drags into translations,
//! - the [`LevelPolicy`](geoscope_pyramid::LevelPolicy) picks which overview to
//!   decode for the visible window.
//!
//! Results go to a [`RenderSurface`] (bitmap, placement, view transform) and
//! to a [`StatusSink`] (progress, header, cursor readouts, warnings). The
//! controller is synchronous and single-threaded; a host that wants status
//! on another thread can pass a [`std::sync::mpsc::Sender<StatusEvent>`].
//!
//! ## Example
//!
//! ```rust
//! use geoscope_source::MemoryRaster;
//! use geoscope_viewport::{RecordingSurface, StatusLog, ViewerConfig, ViewportController};
//! use kurbo::{Point, Size};
//!
//! let raster = MemoryRaster::from_fn("ramp", 4000, 3000, 1, |x, y, _| (x ^ y) as f32).unwrap();
//! let mut viewport = ViewportController::new(
//!     RecordingSurface::new(),
//!     StatusLog::new(),
//!     ViewerConfig::default(),
//!     Size::new(800.0, 600.0),
//! );
//! viewport.open_raster(Box::new(raster)).unwrap();
//!
//! // Fitted to 800x600 and decoded from a coarse overview.
//! let viewer = viewport.metadata().unwrap().viewer_size();
//! assert!((viewer.width - 800.0).abs() < 1e-9 && (viewer.height - 600.0).abs() < 1e-9);
//! assert_eq!(viewport.view().unwrap().level().factor(), 4);
//!
//! // One wheel step in at the cursor reloads a finer window.
//! assert!(viewport.wheel(120.0, Point::new(200.0, 150.0)).unwrap());
//! let readout = viewport.cursor_readout(Point::new(200.0, 150.0)).unwrap();
//! assert!((readout.image.x - 1000.0).abs() < 1e-6);
//! ```

mod config;
mod controller;
mod error;
mod readout;
pub mod status;
mod surface;

pub use config::ViewerConfig;
pub use controller::{ViewportController, ViewportState};
pub use error::ViewportError;
pub use readout::{CursorReadout, MapCoordinate};
pub use status::{NoStatus, StatusEvent, StatusLog, StatusSink};
pub use surface::{RecordingSurface, RenderSurface};
