// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope Geo: the georeferencing model shared by the viewport engine.
//!
//! - [`GeoExtent`]: world bounds of one raster and its margin inside a canvas.
//! - [`CanvasExtent`]: the union extent of all layers shown together.
//! - [`AffineGeoTransform`]: the six-parameter pixel to projected mapping.
//! - [`ImageMetadata`]: size, bands, type, CRS, extent, pyramid levels, and
//!   the current viewer size of one opened raster.
//! - [`Reprojector`]: the seam to a projection backend.
//!
//! ```rust
//! use kurbo::Point;
//! use geoscope_geo::{AffineGeoTransform, ImageMetadata};
//!
//! let meta = ImageMetadata::new("scene.tif", 1000, 800)
//!     .with_geo_transform(AffineGeoTransform::north_up(500_000.0, 4_200_000.0, 30.0, -30.0));
//!
//! let gt = meta.geo_transform.unwrap();
//! let corner = gt.pixel_to_projected(Point::new(1000.0, 800.0));
//! assert_eq!(corner, Point::new(530_000.0, 4_176_000.0));
//! assert_eq!(meta.geo_extent.unwrap().width(), 30_000.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod extent;
mod geotransform;
mod metadata;
mod projection;

pub use extent::{CanvasExtent, GeoExtent};
pub use geotransform::AffineGeoTransform;
pub use metadata::{DataType, ImageMetadata, PixelFormat, ProjectionInfo};
pub use projection::{GeographicIdentity, ProjectionError, Reprojector};
