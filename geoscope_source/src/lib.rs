// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope Source: where raster pixels come from.
//!
//! The viewport never reads files itself. It talks to a [`RasterSource`]:
//! something that describes a raster ([`ImageMetadata`]), can build
//! downsampled overviews, and decodes a [`RasterWindowRequest`] into a
//! [`PixelBuffer`]. A [`RasterOpener`] turns a path into a source.
//!
//! Provided implementations:
//! - [`MemoryRaster`]: samples held in memory, nearest-neighbour overviews,
//!   min/max stretch to 8-bit output.
//! - [`GeoTiffOpener`] and [`GeoTiffRaster`]: (Geo)TIFF files read through
//!   the `tiff` crate a strip or tile at a time, with the file's own
//!   overviews as pyramid levels, georeferencing, and EPSG code.
//! - [`Proj4Reprojector`]: EPSG to WGS 84 through `proj4rs`.
//!
//! ```rust
//! use geoscope_pyramid::{PyramidLevel, RasterWindow, RasterWindowRequest};
//! use geoscope_source::{MemoryRaster, RasterSource};
//!
//! let mut raster =
//!     MemoryRaster::from_fn("gradient", 512, 512, 1, |x, y, _| (x + y) as f32).unwrap();
//! raster.build_pyramids(&[2, 4, 8], &mut |percent| assert!(percent <= 100)).unwrap();
//!
//! let eighth = PyramidLevel::new(8).unwrap();
//! let request = RasterWindowRequest::new(RasterWindow::full(512, 512), eighth);
//! let buffer = raster.decode_window(&request).unwrap();
//! assert_eq!((buffer.width(), buffer.height()), (64, 64));
//! ```

mod buffer;
mod error;
mod geotiff;
mod memory;
mod reproject;
mod stretch;

use std::path::Path;

pub use buffer::PixelBuffer;
pub use error::{DecodeError, OpenError, PyramidError};
pub use geotiff::{GeoTiffOpener, GeoTiffRaster};
pub use memory::MemoryRaster;
pub use reproject::{Proj4Reprojector, WGS84_EPSG, proj4_definition};

use geoscope_geo::{AffineGeoTransform, ImageMetadata, Reprojector};
use geoscope_pyramid::RasterWindowRequest;

/// An opened raster that can describe itself and decode windows.
pub trait RasterSource {
    /// Describes the raster, including the pyramid levels built so far.
    fn metadata(&self) -> ImageMetadata;

    /// Builds overviews for the given downsampling factors.
    ///
    /// `progress` receives integer percentages, ending at 100 on success.
    /// Factors that already exist are skipped.
    ///
    /// # Errors
    ///
    /// A [`PyramidError`] if any factor is invalid or building fails. Callers
    /// can keep decoding at full resolution.
    fn build_pyramids(
        &mut self,
        factors: &[u32],
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), PyramidError>;

    /// Decodes a window at a declared level.
    ///
    /// The buffer's size is [`RasterWindowRequest::decoded_size`].
    ///
    /// # Errors
    ///
    /// A [`DecodeError`] if the window is outside the raster, the level is not
    /// declared, or the backend fails.
    fn decode_window(&self, request: &RasterWindowRequest) -> Result<PixelBuffer, DecodeError>;

    /// Pixel to projected mapping, if the raster is georeferenced.
    fn geo_transform(&self) -> Option<AffineGeoTransform>;

    /// Reprojection to longitude/latitude, if the CRS is known.
    fn reprojector(&self) -> Option<&dyn Reprojector>;
}

/// Opens rasters by path.
pub trait RasterOpener {
    /// Opens `path`.
    ///
    /// # Errors
    ///
    /// An [`OpenError`] if the file cannot be read or decoded.
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>, OpenError>;
}
