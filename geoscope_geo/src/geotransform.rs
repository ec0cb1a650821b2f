// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point};

use crate::extent::GeoExtent;

/// Six-parameter affine mapping from raster pixels to projected coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up rasters both rotation terms are zero and `pixel_height` is
/// negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineGeoTransform {
    /// X of the upper-left corner of the upper-left pixel.
    pub origin_x: f64,
    /// Pixel width in projected units.
    pub pixel_width: f64,
    /// X shift per row.
    pub row_rotation: f64,
    /// Y of the upper-left corner of the upper-left pixel.
    pub origin_y: f64,
    /// Y shift per column.
    pub col_rotation: f64,
    /// Pixel height in projected units, usually negative.
    pub pixel_height: f64,
}

impl AffineGeoTransform {
    /// North-up transform without rotation terms.
    #[must_use]
    pub const fn north_up(
        origin_x: f64,
        origin_y: f64,
        pixel_width: f64,
        pixel_height: f64,
    ) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// From GDAL coefficient order
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    #[must_use]
    pub const fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// To GDAL coefficient order.
    #[must_use]
    pub const fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// From a GeoTIFF tiepoint `(i, j, k, x, y, z)` and pixel scale `(sx, sy, sz)`.
    ///
    /// GeoTIFF stores the pixel scale as a positive number with Y pointing
    /// south, so the resulting `pixel_height` is `-sy`.
    #[must_use]
    pub fn from_tiepoint(tiepoint: [f64; 6], pixel_scale: [f64; 3]) -> Self {
        let [i, j, _, x, y, _] = tiepoint;
        let [sx, sy, _] = pixel_scale;
        Self::north_up(x - i * sx, y + j * sy, sx, -sy)
    }

    /// From a row-major GeoTIFF `ModelTransformation` 4x4 matrix.
    #[must_use]
    pub fn from_model_transformation(m: [f64; 16]) -> Self {
        Self::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]])
    }

    /// The transform as a kurbo affine (pixel space to projected space).
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        Affine::new([
            self.pixel_width,
            self.col_rotation,
            self.row_rotation,
            self.pixel_height,
            self.origin_x,
            self.origin_y,
        ])
    }

    /// Returns `true` if the transform can be inverted.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        let det = self.to_affine().determinant();
        det.is_finite() && det != 0.0
    }

    /// Maps a pixel-space point (column, row) to projected coordinates.
    #[must_use]
    pub fn pixel_to_projected(&self, pixel: Point) -> Point {
        self.to_affine() * pixel
    }

    /// Maps projected coordinates back to pixel space.
    ///
    /// Returns `None` if the transform is singular.
    #[must_use]
    pub fn projected_to_pixel(&self, projected: Point) -> Option<Point> {
        self.is_invertible()
            .then(|| self.to_affine().inverse() * projected)
    }

    /// Projected extent covered by a `width` x `height` raster.
    #[must_use]
    pub fn extent_for(&self, width: u32, height: u32) -> GeoExtent {
        let (w, h) = (f64::from(width), f64::from(height));
        let corners = [
            self.pixel_to_projected(Point::new(0.0, 0.0)),
            self.pixel_to_projected(Point::new(w, 0.0)),
            self.pixel_to_projected(Point::new(0.0, h)),
            self.pixel_to_projected(Point::new(w, h)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = Point::new(min.x.min(c.x), min.y.min(c.y));
            max = Point::new(max.x.max(c.x), max.y.max(c.y));
        }
        GeoExtent::new(min.x, min.y, max.x, max.y)
    }
}

impl Default for AffineGeoTransform {
    /// Identity mapping: one projected unit per pixel, Y pointing down.
    fn default() -> Self {
        Self::north_up(0.0, 0.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::AffineGeoTransform;

    fn utm_like() -> AffineGeoTransform {
        AffineGeoTransform::north_up(440_720.0, 3_751_320.0, 60.0, -60.0)
    }

    #[test]
    fn pixel_to_projected_applies_affine() {
        let gt = utm_like();
        let p = gt.pixel_to_projected(Point::new(10.0, 20.0));
        assert_eq!(p, Point::new(441_320.0, 3_750_120.0));
    }

    #[test]
    fn projected_to_pixel_inverts() {
        let gt = AffineGeoTransform::from_gdal([100.0, 2.0, 0.5, 50.0, 0.25, -3.0]);
        let pixel = Point::new(17.5, 9.25);
        let back = gt
            .projected_to_pixel(gt.pixel_to_projected(pixel))
            .expect("invertible");
        assert!((back.x - pixel.x).abs() < 1e-9);
        assert!((back.y - pixel.y).abs() < 1e-9);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let gt = AffineGeoTransform::north_up(0.0, 0.0, 0.0, -1.0);
        assert!(!gt.is_invertible());
        assert!(gt.projected_to_pixel(Point::ORIGIN).is_none());
    }

    #[test]
    fn gdal_order_round_trips() {
        let coeffs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(AffineGeoTransform::from_gdal(coeffs).to_gdal(), coeffs);
    }

    #[test]
    fn tiepoint_and_scale_build_north_up_transform() {
        let gt = AffineGeoTransform::from_tiepoint([0.0, 0.0, 0.0, 440_720.0, 3_751_320.0, 0.0], [
            60.0, 60.0, 0.0,
        ]);
        assert_eq!(gt, utm_like());

        // A tiepoint anchored at pixel (2, 3) moves the origin back accordingly.
        let gt = AffineGeoTransform::from_tiepoint([2.0, 3.0, 0.0, 1_000.0, 2_000.0, 0.0], [
            10.0, 10.0, 0.0,
        ]);
        assert_eq!(gt.origin_x, 980.0);
        assert_eq!(gt.origin_y, 2_030.0);
    }

    #[test]
    fn model_transformation_maps_matrix_terms() {
        let m = [
            60.0, 0.0, 0.0, 440_720.0, //
            0.0, -60.0, 0.0, 3_751_320.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_eq!(AffineGeoTransform::from_model_transformation(m), utm_like());
    }

    #[test]
    fn extent_for_covers_raster() {
        let extent = utm_like().extent_for(100, 50);
        assert_eq!(extent.min_x(), 440_720.0);
        assert_eq!(extent.max_x(), 446_720.0);
        assert_eq!(extent.min_y(), 3_748_320.0);
        assert_eq!(extent.max_y(), 3_751_320.0);
    }
}
