// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Vec2};

/// World-space bounds of one raster plus its offset inside a shared canvas.
///
/// The margin is expressed in content pixels: how far right (`x`) and down
/// (`y`) from the canvas origin this raster's top-left corner is drawn. It is
/// derived state, recomputed by [`GeoExtent::calculate_margin`] whenever the
/// canvas or the pixels-per-world-unit scale changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoExtent {
    bounds: Rect,
    margin: Vec2,
}

impl GeoExtent {
    /// Creates an extent from world-space bounds with a zero margin.
    ///
    /// The bounds are normalized so that `min <= max` on both axes.
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::from_rect(Rect::new(min_x, min_y, max_x, max_y))
    }

    /// Creates an extent from a world-space rectangle with a zero margin.
    #[must_use]
    pub fn from_rect(bounds: Rect) -> Self {
        Self {
            bounds: bounds.abs(),
            margin: Vec2::ZERO,
        }
    }

    /// World-space bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Minimum world X.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.bounds.x0
    }

    /// Minimum world Y.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.bounds.y0
    }

    /// Maximum world X.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.bounds.x1
    }

    /// Maximum world Y.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.bounds.y1
    }

    /// World-space width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    /// World-space height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Returns `true` if the extent has no usable area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Offset of this raster inside the canvas, in content pixels.
    #[must_use]
    pub fn margin(&self) -> Vec2 {
        self.margin
    }

    /// Left margin in content pixels.
    #[must_use]
    pub fn margin_left(&self) -> f64 {
        self.margin.x
    }

    /// Top margin in content pixels.
    #[must_use]
    pub fn margin_top(&self) -> f64 {
        self.margin.y
    }

    /// Overrides the margin.
    pub fn set_margin(&mut self, margin: Vec2) {
        self.margin = margin;
    }

    /// Recomputes the margin against `canvas` at `pixels_per_unit`.
    ///
    /// World Y grows north while content Y grows down, so the top margin is
    /// measured from the canvas' northern edge.
    pub fn calculate_margin(&mut self, canvas: &CanvasExtent, pixels_per_unit: Vec2) {
        let canvas = canvas.bounds();
        self.margin = Vec2::new(
            (self.min_x() - canvas.x0) * pixels_per_unit.x,
            (canvas.y1 - self.max_y()) * pixels_per_unit.y,
        );
    }
}

/// The union extent of every layer sharing one display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasExtent {
    bounds: Rect,
}

impl CanvasExtent {
    /// Creates a canvas from world-space bounds.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: bounds.abs(),
        }
    }

    /// A canvas that exactly covers one raster.
    #[must_use]
    pub fn from_extent(extent: &GeoExtent) -> Self {
        Self::new(extent.bounds())
    }

    /// The union of several layer extents, or `None` if there are none.
    #[must_use]
    pub fn union_of<'a>(extents: impl IntoIterator<Item = &'a GeoExtent>) -> Option<Self> {
        extents
            .into_iter()
            .map(GeoExtent::bounds)
            .reduce(|acc, r| acc.union(r))
            .map(Self::new)
    }

    /// World-space bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// World-space width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    /// World-space height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Returns `true` if the canvas has no usable area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Vec2};

    use super::{CanvasExtent, GeoExtent};

    #[test]
    fn new_normalizes_bounds() {
        let extent = GeoExtent::new(10.0, 5.0, -10.0, -5.0);
        assert_eq!(extent.bounds(), Rect::new(-10.0, -5.0, 10.0, 5.0));
        assert_eq!(extent.margin(), Vec2::ZERO);
        assert!(!extent.is_degenerate());
    }

    #[test]
    fn zero_width_extent_is_degenerate() {
        assert!(GeoExtent::new(1.0, 0.0, 1.0, 10.0).is_degenerate());
        assert!(CanvasExtent::new(Rect::new(0.0, 0.0, 5.0, 0.0)).is_degenerate());
    }

    #[test]
    fn union_covers_all_layers() {
        let a = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let b = GeoExtent::new(5.0, -5.0, 20.0, 8.0);
        let canvas = CanvasExtent::union_of([&a, &b]).expect("two layers");
        assert_eq!(canvas.bounds(), Rect::new(0.0, -5.0, 20.0, 10.0));
        assert!(CanvasExtent::union_of([]).is_none());
    }

    #[test]
    fn margin_measures_from_canvas_north_west_corner() {
        let canvas = CanvasExtent::new(Rect::new(100.0, 50.0, 200.0, 150.0));
        let mut layer = GeoExtent::new(120.0, 60.0, 180.0, 130.0);
        layer.calculate_margin(&canvas, Vec2::new(2.0, 3.0));
        assert_eq!(layer.margin_left(), 40.0);
        assert_eq!(layer.margin_top(), 60.0);
    }

    #[test]
    fn single_layer_has_zero_margin() {
        let mut layer = GeoExtent::new(120.0, 60.0, 180.0, 130.0);
        let canvas = CanvasExtent::from_extent(&layer);
        layer.calculate_margin(&canvas, Vec2::new(7.5, 7.5));
        assert_eq!(layer.margin(), Vec2::ZERO);
    }
}
