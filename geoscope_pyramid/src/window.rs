// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};

use crate::levels::PyramidLevel;

/// An integer pixel window in full-resolution raster space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterWindow {
    /// Left column of the window.
    pub x: u32,
    /// Top row of the window.
    pub y: u32,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
}

impl RasterWindow {
    /// Creates a window from its offset and size.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The window covering a whole `width` x `height` raster.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Snaps a fractional image-space rectangle to the pixels it touches.
    ///
    /// The rectangle is rounded outward and clipped to the raster. Returns
    /// `None` when nothing of the raster is covered, for example after the
    /// user panned the image entirely off screen.
    #[must_use]
    pub fn from_image_rect(rect: Rect, image_width: u32, image_height: u32) -> Option<Self> {
        let bounds = Rect::new(0.0, 0.0, f64::from(image_width), f64::from(image_height));
        let clipped = rect.abs().expand().intersect(bounds);
        if !(clipped.width() > 0.0 && clipped.height() > 0.0) {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "values are integral and clipped to the u32 raster bounds"
        )]
        let (x0, y0, x1, y1) = (
            clipped.x0 as u32,
            clipped.y0 as u32,
            clipped.x1 as u32,
            clipped.y1 as u32,
        );
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Returns `true` if the window covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    #[must_use]
    pub const fn max_x(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    #[must_use]
    pub const fn max_y(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if the window lies inside a `width` x `height` raster.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|x1| x1 <= width)
            && self.y.checked_add(self.height).is_some_and(|y1| y1 <= height)
    }

    /// The window as a floating point rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.max_x()),
            f64::from(self.max_y()),
        )
    }

    /// The window size as a floating point size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// A decode request handed to a raster source: which pixels, at which level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterWindowRequest {
    /// The requested window in full-resolution pixels.
    pub window: RasterWindow,
    /// The pyramid level to read it from.
    pub level: PyramidLevel,
}

impl RasterWindowRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(window: RasterWindow, level: PyramidLevel) -> Self {
        Self { window, level }
    }

    /// The requested window expressed in the pixel grid of the chosen level.
    ///
    /// The start is rounded down and the end rounded up, so the level window
    /// always covers the full-resolution window.
    #[must_use]
    pub fn level_window(&self) -> RasterWindow {
        let f = self.level.factor();
        let x0 = self.window.x / f;
        let y0 = self.window.y / f;
        let x1 = self.window.max_x().div_ceil(f);
        let y1 = self.window.max_y().div_ceil(f);
        RasterWindow::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Width and height of the decoded buffer.
    #[must_use]
    pub fn decoded_size(&self) -> (u32, u32) {
        let w = self.level_window();
        (w.width, w.height)
    }

    /// The full-resolution pixels the decoded buffer actually covers.
    ///
    /// This is the level window scaled back up, clipped to a raster of
    /// `image_width` x `image_height`. It contains [`Self::window`] and is
    /// where a renderer should place the decoded bitmap.
    #[must_use]
    pub fn covered_window(&self, image_width: u32, image_height: u32) -> RasterWindow {
        let f = self.level.factor();
        let level = self.level_window();
        let x0 = level.x.saturating_mul(f).min(image_width);
        let y0 = level.y.saturating_mul(f).min(image_height);
        let x1 = level.max_x().saturating_mul(f).min(image_width);
        let y1 = level.max_y().saturating_mul(f).min(image_height);
        RasterWindow::new(x0, y0, x1 - x0, y1 - y0)
    }
}
