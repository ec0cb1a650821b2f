// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use kurbo::Point;

/// Failure to turn projected coordinates into geographic ones.
///
/// None of these are fatal for a viewer: coordinate readouts fall back to
/// projected or pixel coordinates.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// The raster carries no spatial reference at all.
    #[error("raster has no spatial reference")]
    MissingSpatialReference,
    /// The EPSG code is not known to the projection backend.
    #[error("EPSG:{0} is not a known coordinate reference system")]
    UnknownEpsg(u16),
    /// The CRS definition could not be parsed.
    #[error("invalid projection definition: {0}")]
    InvalidDefinition(String),
    /// The backend rejected the point.
    #[error("coordinate transform failed: {0}")]
    TransformFailed(String),
}

/// Converts a raster's native projected coordinates to longitude/latitude.
///
/// Implementations are expected to be pure per call; callers do not cache.
pub trait Reprojector {
    /// Reprojects `projected` to geographic coordinates, `x` = longitude and
    /// `y` = latitude, both in degrees.
    fn to_geographic(&self, projected: Point) -> Result<Point, ProjectionError>;
}

impl<R: Reprojector + ?Sized> Reprojector for &R {
    fn to_geographic(&self, projected: Point) -> Result<Point, ProjectionError> {
        (**self).to_geographic(projected)
    }
}

/// Reprojector for rasters whose native CRS is already longitude/latitude.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeographicIdentity;

impl Reprojector for GeographicIdentity {
    fn to_geographic(&self, projected: Point) -> Result<Point, ProjectionError> {
        Ok(projected)
    }
}
