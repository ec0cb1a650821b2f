// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use geoscope_pyramid::{PyramidLevel, RasterWindow};
use kurbo::{Affine, Point, Vec2};

/// Affine view over the content canvas, plus what is currently decoded.
///
/// The content canvas holds the raster at its viewer size (and margin). The
/// view maps content-local coordinates to screen coordinates:
///
/// ```text
/// screen = translate(translation) * rotate_about(pivot, rotation) * scale(sx, sy) * content
/// ```
///
/// `ViewState` also records the pyramid level and raster window of the bitmap
/// that is on screen, so coordinate queries and reload decisions read one
/// consistent snapshot.
#[derive(Clone, Debug)]
pub struct ViewState {
    scale: Vec2,
    translation: Vec2,
    rotation: f64,
    pivot: Point,
    level: PyramidLevel,
    window: RasterWindow,
    content_to_screen: Affine,
    screen_to_content: Affine,
}

impl ViewState {
    /// Identity view: unit scale, no translation or rotation, nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        let mut view = Self {
            scale: Vec2::new(1.0, 1.0),
            translation: Vec2::ZERO,
            rotation: 0.0,
            pivot: Point::ORIGIN,
            level: PyramidLevel::FULL,
            window: RasterWindow::default(),
            content_to_screen: Affine::IDENTITY,
            screen_to_content: Affine::IDENTITY,
        };
        view.rebuild_transforms();
        view
    }

    /// Scale factors `(sx, sy)`.
    #[must_use]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Sets the scale factors.
    ///
    /// Factors that are not finite and positive are ignored.
    pub fn set_scale(&mut self, scale: Vec2) {
        if !(scale.is_finite() && scale.x > 0.0 && scale.y > 0.0) || scale == self.scale {
            return;
        }
        self.scale = scale;
        self.rebuild_transforms();
    }

    /// Translation `(tx, ty)` in screen pixels.
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Sets the translation.
    pub fn set_translation(&mut self, translation: Vec2) {
        if self.translation == translation {
            return;
        }
        self.translation = translation;
        self.rebuild_transforms();
    }

    /// Rotation in degrees, clockwise on a y-down screen.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Point the rotation turns about, in pre-translation coordinates.
    #[must_use]
    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Sets the rotation angle in degrees and its pivot.
    pub fn set_rotation(&mut self, degrees: f64, pivot: Point) {
        if !degrees.is_finite() {
            return;
        }
        self.rotation = degrees;
        self.pivot = pivot;
        self.rebuild_transforms();
    }

    /// Pyramid level of the bitmap currently shown.
    #[must_use]
    pub fn level(&self) -> PyramidLevel {
        self.level
    }

    /// Raster window of the bitmap currently shown.
    #[must_use]
    pub fn window(&self) -> RasterWindow {
        self.window
    }

    /// Records what was decoded for display.
    pub fn set_loaded(&mut self, level: PyramidLevel, window: RasterWindow) {
        self.level = level;
        self.window = window;
    }

    /// Content-local to screen transform.
    #[must_use]
    pub fn content_to_screen(&self) -> Affine {
        self.content_to_screen
    }

    /// Screen to content-local transform.
    #[must_use]
    pub fn screen_to_content(&self) -> Affine {
        self.screen_to_content
    }

    /// Scales the view about a screen-space anchor.
    ///
    /// The content point under `anchor` stays under `anchor`.
    pub fn zoom_about_screen_point(&mut self, anchor: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let content_at_anchor = self.screen_to_content * anchor;
        self.scale *= factor;
        self.rebuild_transforms();
        let new_anchor = self.content_to_screen * content_at_anchor;
        self.translation += anchor - new_anchor;
        self.rebuild_transforms();
    }

    /// Re-anchors the translation after the content itself grew by `rate`.
    ///
    /// Zooming the raster enlarges the content canvas (viewer size, margins)
    /// rather than the view scale. The content point that was under `anchor`
    /// now sits at `rate` times its old content coordinates; this moves the
    /// translation so it is under `anchor` again. For an unscaled, unrotated
    /// view this is `translation -= c * (rate - 1)` with `c` the content-local
    /// anchor.
    pub fn anchor_content_rescale(&mut self, anchor: Point, rate: f64) {
        if !(rate.is_finite() && rate > 0.0) {
            return;
        }
        let c = self.screen_to_content * anchor;
        let moved = self.untranslated() * Point::new(c.x * rate, c.y * rate);
        self.translation = anchor.to_vec2() - moved.to_vec2();
        self.rebuild_transforms();
    }

    /// Rotates to `degrees` about a screen-space anchor.
    ///
    /// The anchor becomes the pivot and the content point under it stays
    /// under it, whatever rotation was applied before.
    pub fn rotate_about_screen_point(&mut self, degrees: f64, anchor: Point) {
        if !degrees.is_finite() {
            return;
        }
        let content_at_anchor = self.screen_to_content * anchor;
        self.rotation = degrees;
        self.pivot = anchor;
        self.rebuild_transforms();
        let new_anchor = self.content_to_screen * content_at_anchor;
        self.translation += anchor - new_anchor;
        self.rebuild_transforms();
    }

    /// Moves the translation so `content` lands on `screen`.
    ///
    /// With unit scale and no rotation, centering a canvas of size `c` in a
    /// screen of size `s` this way gives `(s - c) / 2`.
    pub fn place_content_point(&mut self, content: Point, screen: Point) {
        let moved = self.untranslated() * content;
        self.translation = screen - moved;
        self.rebuild_transforms();
    }

    /// Snapshot of the current view state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewStateDebugInfo {
        ViewStateDebugInfo {
            scale: self.scale,
            translation: self.translation,
            rotation: self.rotation,
            pivot: self.pivot,
            level: self.level,
            window: self.window,
        }
    }

    fn untranslated(&self) -> Affine {
        Affine::rotate_about(self.rotation.to_radians(), self.pivot)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    fn rebuild_transforms(&mut self) {
        // Content → screen: scale, then rotate about the pivot, then translate.
        self.content_to_screen = Affine::translate(self.translation) * self.untranslated();
        self.screen_to_content = self.content_to_screen.inverse();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// Debug snapshot of a [`ViewState`].
#[derive(Clone, Copy, Debug)]
pub struct ViewStateDebugInfo {
    /// Scale factors.
    pub scale: Vec2,
    /// Translation in screen pixels.
    pub translation: Vec2,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Rotation pivot.
    pub pivot: Point,
    /// Loaded pyramid level.
    pub level: PyramidLevel,
    /// Loaded raster window.
    pub window: RasterWindow,
}

#[cfg(test)]
mod tests {
    use geoscope_pyramid::{PyramidLevel, RasterWindow};
    use kurbo::{Point, Vec2};

    use super::ViewState;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "x: {} vs {}", a.x, b.x);
        assert!((a.y - b.y).abs() < 1e-9, "y: {} vs {}", a.y, b.y);
    }

    #[test]
    fn identity_view_roundtrip() {
        let view = ViewState::new();
        let p = Point::new(10.0, -5.0);
        assert_eq!(view.content_to_screen() * p, p);
        assert_close(view.screen_to_content() * (view.content_to_screen() * p), p);
    }

    #[test]
    fn translation_and_scale_compose() {
        let mut view = ViewState::new();
        view.set_scale(Vec2::new(2.0, 3.0));
        view.set_translation(Vec2::new(10.0, 20.0));
        assert_close(
            view.content_to_screen() * Point::new(1.0, 1.0),
            Point::new(12.0, 23.0),
        );
    }

    #[test]
    fn set_scale_ignores_invalid_factors() {
        let mut view = ViewState::new();
        view.set_scale(Vec2::new(0.0, 2.0));
        view.set_scale(Vec2::new(f64::INFINITY, 2.0));
        assert_eq!(view.scale(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot_fixed() {
        let mut view = ViewState::new();
        let pivot = Point::new(400.0, 300.0);
        view.set_rotation(90.0, pivot);
        assert_close(view.content_to_screen() * pivot, pivot);
        // A point right of the pivot swings below it on a y-down screen.
        assert_close(
            view.content_to_screen() * Point::new(500.0, 300.0),
            Point::new(400.0, 400.0),
        );
    }

    #[test]
    fn zoom_about_anchor_keeps_anchor_fixed() {
        let mut view = ViewState::new();
        view.set_translation(Vec2::new(-35.0, 12.0));
        let anchor = Point::new(400.0, 300.0);
        let before = view.screen_to_content() * anchor;

        view.zoom_about_screen_point(anchor, 1.1);
        let after = view.screen_to_content() * anchor;

        assert_close(before, after);
        assert!((view.scale().x - 1.1).abs() < 1e-12);
    }

    #[test]
    fn anchor_content_rescale_matches_offset_formula() {
        let mut view = ViewState::new();
        let rate = 1.0 / 0.7;
        view.anchor_content_rescale(Point::new(100.0, 100.0), rate);
        let offset = (100.0_f64 * (1.0 - rate)).abs();
        assert!((offset - 42.857_142_857).abs() < 1e-6);
        assert!((view.translation().x + offset).abs() < 1e-9);
        assert!((view.translation().y + offset).abs() < 1e-9);
    }

    #[test]
    fn anchor_content_rescale_under_rotation_and_scale() {
        let mut view = ViewState::new();
        view.set_scale(Vec2::new(1.5, 1.5));
        view.set_rotation(30.0, Point::new(320.0, 240.0));
        view.set_translation(Vec2::new(17.0, -9.0));

        let anchor = Point::new(250.0, 130.0);
        let content = view.screen_to_content() * anchor;
        let rate = 0.7;
        view.anchor_content_rescale(anchor, rate);

        let scaled = Point::new(content.x * rate, content.y * rate);
        assert_close(view.content_to_screen() * scaled, anchor);
    }

    #[test]
    fn rotation_about_screen_point_keeps_content_under_it() {
        let mut view = ViewState::new();
        view.set_translation(Vec2::new(25.0, 50.0));
        let anchor = Point::new(400.0, 300.0);
        let before = view.screen_to_content() * anchor;

        view.rotate_about_screen_point(45.0, anchor);
        assert_close(view.screen_to_content() * anchor, before);
        view.rotate_about_screen_point(-120.0, anchor);
        assert_close(view.screen_to_content() * anchor, before);
        assert_eq!(view.rotation(), -120.0);
    }

    #[test]
    fn place_content_point_centers_canvas() {
        let mut view = ViewState::new();
        view.place_content_point(Point::new(375.0, 300.0), Point::new(400.0, 300.0));
        assert_eq!(view.translation(), Vec2::new(25.0, 0.0));

        view.set_scale(Vec2::new(2.0, 2.0));
        view.set_rotation(90.0, Point::new(400.0, 300.0));
        view.place_content_point(Point::new(10.0, 10.0), Point::new(123.0, 45.0));
        assert_close(
            view.content_to_screen() * Point::new(10.0, 10.0),
            Point::new(123.0, 45.0),
        );
    }

    #[test]
    fn set_loaded_records_level_and_window() {
        let mut view = ViewState::new();
        let level = PyramidLevel::new(8).unwrap();
        let window = RasterWindow::new(1, 2, 3, 4);
        view.set_loaded(level, window);
        let info = view.debug_info();
        assert_eq!(info.level, level);
        assert_eq!(info.window, window);
    }
}
