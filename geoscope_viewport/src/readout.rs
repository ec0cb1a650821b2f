// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::Point;

/// Map coordinate under the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapCoordinate {
    /// Longitude and latitude in degrees.
    Geographic(Point),
    /// Projected coordinates in the raster's CRS; reprojection was unavailable.
    Projected(Point),
}

impl MapCoordinate {
    /// The coordinate pair, whichever space it is in.
    #[must_use]
    pub fn point(self) -> Point {
        match self {
            Self::Geographic(p) | Self::Projected(p) => p,
        }
    }
}

/// What the cursor points at, in every coordinate space the viewer knows.
///
/// Formats as the status line
/// `Map(lon, lat), Image(x, y), Display(x, y)`. The map part is dropped when
/// the raster has no geotransform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorReadout {
    /// Screen position.
    pub display: Point,
    /// Full-resolution image pixel.
    pub image: Point,
    /// Map coordinate, if the raster is georeferenced.
    pub map: Option<MapCoordinate>,
}

impl fmt::Display for CursorReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.map {
            Some(MapCoordinate::Geographic(p)) => write!(f, "Map({:.6}, {:.6}), ", p.x, p.y)?,
            Some(MapCoordinate::Projected(p)) => write!(f, "Map({:.3}, {:.3}), ", p.x, p.y)?,
            None => {}
        }
        write!(
            f,
            "Image({:.1}, {:.1}), Display({:.0}, {:.0})",
            self.image.x, self.image.y, self.display.x, self.display.y
        )
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::{CursorReadout, MapCoordinate};

    #[test]
    fn status_line_with_geographic_map() {
        let readout = CursorReadout {
            display: Point::new(400.0, 300.0),
            image: Point::new(5000.0, 4000.26),
            map: Some(MapCoordinate::Geographic(Point::new(129.0, 36.125))),
        };
        assert_eq!(
            readout.to_string(),
            "Map(129.000000, 36.125000), Image(5000.0, 4000.3), Display(400, 300)"
        );
    }

    #[test]
    fn status_line_without_geotransform_drops_map() {
        let readout = CursorReadout {
            display: Point::new(1.0, 2.0),
            image: Point::new(3.0, 4.0),
            map: None,
        };
        assert_eq!(readout.to_string(), "Image(3.0, 4.0), Display(1, 2)");
    }

    #[test]
    fn projected_fallback_keeps_point() {
        let map = MapCoordinate::Projected(Point::new(500_000.0, 4_000_000.0));
        assert_eq!(map.point(), Point::new(500_000.0, 4_000_000.0));
    }
}
