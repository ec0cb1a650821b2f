// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use geoscope_geo::{ProjectionError, Reprojector};
use kurbo::Point;
use proj4rs::proj::Proj;

/// EPSG code of WGS 84 longitude/latitude, the target of every readout.
pub const WGS84_EPSG: u16 = 4326;

/// Reprojects a raster's native CRS to WGS 84 with `proj4rs`.
///
/// CRS definitions come from the `crs-definitions` EPSG table. Geographic
/// source CRSs are fed to `proj4rs` in radians.
pub struct Proj4Reprojector {
    epsg: u16,
    source: Proj,
    target: Proj,
}

impl fmt::Debug for Proj4Reprojector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj4Reprojector")
            .field("epsg", &self.epsg)
            .finish_non_exhaustive()
    }
}

/// The PROJ.4 definition of an EPSG code, if known.
#[must_use]
pub fn proj4_definition(epsg: u16) -> Option<&'static str> {
    crs_definitions::from_code(epsg).map(|def| def.proj4)
}

fn parse(epsg: u16) -> Result<Proj, ProjectionError> {
    let definition = proj4_definition(epsg).ok_or(ProjectionError::UnknownEpsg(epsg))?;
    Proj::from_proj_string(definition)
        .map_err(|err| ProjectionError::InvalidDefinition(format!("EPSG:{epsg}: {err}")))
}

impl Proj4Reprojector {
    /// Creates a reprojector from `epsg` to WGS 84.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnknownEpsg`] if the code is not in the table, or
    /// [`ProjectionError::InvalidDefinition`] if `proj4rs` rejects it.
    pub fn from_epsg(epsg: u16) -> Result<Self, ProjectionError> {
        Ok(Self {
            epsg,
            source: parse(epsg)?,
            target: parse(WGS84_EPSG)?,
        })
    }

    /// Source EPSG code.
    #[must_use]
    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// Returns `true` if the source CRS is longitude/latitude.
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.source.is_latlong()
    }
}

impl Reprojector for Proj4Reprojector {
    fn to_geographic(&self, projected: Point) -> Result<Point, ProjectionError> {
        let mut point = if self.is_geographic() {
            (projected.x.to_radians(), projected.y.to_radians(), 0.0)
        } else {
            (projected.x, projected.y, 0.0)
        };
        proj4rs::transform::transform(&self.source, &self.target, &mut point).map_err(|err| {
            let route = format!("EPSG:{} to EPSG:{WGS84_EPSG}", self.epsg);
            ProjectionError::TransformFailed(format!("{route}: {err}"))
        })?;
        let lon_lat = Point::new(point.0.to_degrees(), point.1.to_degrees());
        if !lon_lat.is_finite() {
            return Err(ProjectionError::TransformFailed(format!(
                "EPSG:{} produced a non-finite coordinate",
                self.epsg
            )));
        }
        Ok(lon_lat)
    }
}

#[cfg(test)]
mod tests {
    use geoscope_geo::{ProjectionError, Reprojector};
    use kurbo::Point;

    use super::Proj4Reprojector;

    fn assert_near(a: Point, b: Point, tolerance: f64) {
        assert!(
            (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance,
            "{a:?} vs {b:?}"
        );
    }

    #[test]
    fn wgs84_is_identity() {
        let reprojector = Proj4Reprojector::from_epsg(4326).unwrap();
        assert!(reprojector.is_geographic());
        let p = reprojector.to_geographic(Point::new(127.5, 36.25)).unwrap();
        assert_near(p, Point::new(127.5, 36.25), 1e-9);
    }

    #[test]
    fn web_mercator_origin_is_null_island() {
        let reprojector = Proj4Reprojector::from_epsg(3857).unwrap();
        assert!(!reprojector.is_geographic());
        let p = reprojector.to_geographic(Point::ORIGIN).unwrap();
        assert_near(p, Point::ORIGIN, 1e-9);
    }

    #[test]
    fn utm_central_meridian() {
        // UTM zone 52N: easting 500 km lies on the 129E central meridian.
        let reprojector = Proj4Reprojector::from_epsg(32652).unwrap();
        let p = reprojector
            .to_geographic(Point::new(500_000.0, 4_000_000.0))
            .unwrap();
        assert!((p.x - 129.0).abs() < 1e-6, "longitude {}", p.x);
        assert!(p.y > 36.0 && p.y < 36.2, "latitude {}", p.y);
    }

    #[test]
    fn unknown_code_is_reported() {
        assert_eq!(
            Proj4Reprojector::from_epsg(1).map(|r| r.epsg()),
            Err(ProjectionError::UnknownEpsg(1))
        );
    }
}
