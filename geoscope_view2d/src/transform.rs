// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between screen, content-local, image, projected, and world
//! coordinates.
//!
//! The chain is:
//!
//! ```text
//! screen --(view affine)^-1--> content --(- margin, * image/viewer)--> image
//!        --(geotransform)--> projected --(reprojector)--> world
//! ```
//!
//! Every function is pure. Nothing here caches projection results.

use geoscope_geo::{AffineGeoTransform, ImageMetadata, ProjectionError, Reprojector};
use kurbo::{Point, Rect, Size, Vec2};

use crate::view_state::ViewState;

/// A coordinate conversion that needs a positive viewer size ran without one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Viewer width or height is zero, typically before the first fit.
    #[error("viewer size is not positive; cannot convert between content and image pixels")]
    DivisionByZero,
}

/// Screen point to content-local point.
#[must_use]
pub fn screen_to_content(p: Point, view: &ViewState) -> Point {
    view.screen_to_content() * p
}

/// Content-local point to screen point.
#[must_use]
pub fn content_to_screen(p: Point, view: &ViewState) -> Point {
    view.content_to_screen() * p
}

fn margin_of(meta: &ImageMetadata) -> Vec2 {
    meta.geo_extent.map(|extent| extent.margin()).unwrap_or(Vec2::ZERO)
}

/// Ratio of image pixels per content pixel on each axis.
fn image_per_viewer(meta: &ImageMetadata) -> Result<Vec2, TransformError> {
    let viewer = meta.viewer_size();
    if !(viewer.width > 0.0 && viewer.height > 0.0) {
        return Err(TransformError::DivisionByZero);
    }
    let image = meta.image_size();
    Ok(Vec2::new(image.width / viewer.width, image.height / viewer.height))
}

/// Content-local point to full-resolution image pixel.
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn content_to_image(p: Point, meta: &ImageMetadata) -> Result<Point, TransformError> {
    let ratio = image_per_viewer(meta)?;
    let local = p - margin_of(meta);
    Ok(Point::new(local.x * ratio.x, local.y * ratio.y))
}

/// Full-resolution image pixel to content-local point.
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn image_to_content(p: Point, meta: &ImageMetadata) -> Result<Point, TransformError> {
    let ratio = image_per_viewer(meta)?;
    if !(ratio.x > 0.0 && ratio.y > 0.0) {
        return Err(TransformError::DivisionByZero);
    }
    Ok(Point::new(p.x / ratio.x, p.y / ratio.y) + margin_of(meta))
}

/// Screen point to full-resolution image pixel.
///
/// With an identity view and no margin this is
/// `x * imageWidth / viewerWidth`, `y * imageHeight / viewerHeight`.
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn screen_to_image(
    p: Point,
    view: &ViewState,
    meta: &ImageMetadata,
) -> Result<Point, TransformError> {
    content_to_image(screen_to_content(p, view), meta)
}

/// Full-resolution image pixel to screen point; inverse of [`screen_to_image`].
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn image_to_screen(
    p: Point,
    view: &ViewState,
    meta: &ImageMetadata,
) -> Result<Point, TransformError> {
    Ok(content_to_screen(image_to_content(p, meta)?, view))
}

/// Image pixel to projected coordinates through the geotransform.
#[must_use]
pub fn image_to_projected(p: Point, geo_transform: &AffineGeoTransform) -> Point {
    geo_transform.pixel_to_projected(p)
}

/// Image pixel to longitude/latitude.
///
/// # Errors
///
/// Whatever the reprojector reports; callers fall back to projected or pixel
/// coordinates.
pub fn image_to_world(
    p: Point,
    geo_transform: &AffineGeoTransform,
    reprojector: &impl Reprojector,
) -> Result<Point, ProjectionError> {
    reprojector.to_geographic(image_to_projected(p, geo_transform))
}

/// Bounding box, in image pixels, of the screen rectangle `(0, 0)..screen`.
///
/// Under rotation this is the bounding box of the four mapped corners. The
/// result is not clamped to the raster.
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn visible_image_rect(
    view: &ViewState,
    meta: &ImageMetadata,
    screen: Size,
) -> Result<Rect, TransformError> {
    let corners = [
        Point::ORIGIN,
        Point::new(screen.width, 0.0),
        Point::new(0.0, screen.height),
        Point::new(screen.width, screen.height),
    ];
    let first = screen_to_image(corners[0], view, meta)?;
    let mut rect = Rect::from_points(first, first);
    for corner in &corners[1..] {
        rect = rect.union_pt(screen_to_image(*corner, view, meta)?);
    }
    Ok(rect)
}

/// Maps an image-space rectangle into content-local space.
///
/// # Errors
///
/// [`TransformError::DivisionByZero`] if the viewer size is not positive.
pub fn image_rect_to_content(rect: Rect, meta: &ImageMetadata) -> Result<Rect, TransformError> {
    let p0 = image_to_content(rect.origin(), meta)?;
    let p1 = image_to_content(Point::new(rect.x1, rect.y1), meta)?;
    Ok(Rect::from_points(p0, p1))
}

#[cfg(test)]
mod tests {
    use geoscope_geo::{
        AffineGeoTransform, GeographicIdentity, ImageMetadata, ProjectionError, Reprojector,
    };
    use kurbo::{Point, Rect, Size, Vec2};

    use super::{
        TransformError, image_rect_to_content, image_to_screen, image_to_world, screen_to_image,
        visible_image_rect,
    };
    use crate::view_state::ViewState;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-6, "x: {} vs {}", a.x, b.x);
        assert!((a.y - b.y).abs() < 1e-6, "y: {} vs {}", a.y, b.y);
    }

    fn fitted_meta() -> ImageMetadata {
        let mut meta = ImageMetadata::new("scene.tif", 10_000, 8_000);
        assert!(meta.set_viewer_size(Size::new(750.0, 600.0)));
        meta
    }

    #[test]
    fn identity_view_uses_viewer_ratio() {
        let meta = fitted_meta();
        let view = ViewState::new();
        let p = screen_to_image(Point::new(375.0, 300.0), &view, &meta).unwrap();
        assert_close(p, Point::new(5_000.0, 4_000.0));
    }

    #[test]
    fn screen_and_image_are_mutual_inverses() {
        let meta = fitted_meta();
        let mut view = ViewState::new();
        view.set_translation(Vec2::new(25.0, -40.0));
        view.set_scale(Vec2::new(1.3, 1.3));
        view.set_rotation(17.0, Point::new(400.0, 300.0));

        for &(x, y) in &[(0.0, 0.0), (750.0, 600.0), (123.4, 567.8), (700.0, 10.0)] {
            let p = Point::new(x, y);
            let back = image_to_screen(screen_to_image(p, &view, &meta).unwrap(), &view, &meta)
                .unwrap();
            assert_close(back, p);
        }
    }

    #[test]
    fn margin_shifts_content_origin() {
        let mut meta = fitted_meta();
        let mut extent = geoscope_geo::GeoExtent::new(0.0, 0.0, 10.0, 8.0);
        extent.set_margin(Vec2::new(30.0, 12.0));
        meta = meta.with_geo_extent(extent);
        let view = ViewState::new();
        let p = screen_to_image(Point::new(30.0, 12.0), &view, &meta).unwrap();
        assert_close(p, Point::ORIGIN);
    }

    #[test]
    fn rotation_maps_center_to_center() {
        let meta = fitted_meta();
        let mut view = ViewState::new();
        let center = Point::new(375.0, 300.0);
        view.set_rotation(45.0, center);
        let p = screen_to_image(center, &view, &meta).unwrap();
        assert_close(p, Point::new(5_000.0, 4_000.0));
    }

    #[test]
    fn zero_viewer_size_is_division_by_zero() {
        let meta = ImageMetadata::new("empty.tif", 0, 0);
        let view = ViewState::new();
        assert_eq!(
            screen_to_image(Point::ORIGIN, &view, &meta),
            Err(TransformError::DivisionByZero)
        );
        assert_eq!(
            image_to_screen(Point::ORIGIN, &view, &meta),
            Err(TransformError::DivisionByZero)
        );
    }

    #[test]
    fn visible_rect_covers_screen_corners() {
        let meta = fitted_meta();
        let mut view = ViewState::new();
        view.set_translation(Vec2::new(25.0, 0.0));
        let rect = visible_image_rect(&view, &meta, Size::new(800.0, 600.0)).unwrap();
        let ratio = 10_000.0 / 750.0;
        assert!((rect.x0 + 25.0 * ratio).abs() < 1e-6);
        assert!((rect.x1 - 775.0 * ratio).abs() < 1e-6);
        assert!((rect.y1 - 8_000.0).abs() < 1e-6);
    }

    #[test]
    fn image_rect_to_content_scales_down() {
        let meta = fitted_meta();
        let rect = image_rect_to_content(Rect::new(0.0, 0.0, 10_000.0, 8_000.0), &meta).unwrap();
        assert!((rect.width() - 750.0).abs() < 1e-9);
        assert!((rect.height() - 600.0).abs() < 1e-9);
    }

    struct NoCrs;

    impl Reprojector for NoCrs {
        fn to_geographic(&self, _: Point) -> Result<Point, ProjectionError> {
            Err(ProjectionError::MissingSpatialReference)
        }
    }

    #[test]
    fn image_to_world_chains_geotransform_and_reprojector() {
        let gt = AffineGeoTransform::north_up(126.0, 38.0, 0.001, -0.001);
        let world = image_to_world(Point::new(1_000.0, 2_000.0), &gt, &GeographicIdentity).unwrap();
        assert_close(world, Point::new(127.0, 36.0));
        assert_eq!(
            image_to_world(Point::ORIGIN, &gt, &NoCrs),
            Err(ProjectionError::MissingSpatialReference)
        );
    }
}
