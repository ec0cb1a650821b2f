// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;

use crate::levels::{PyramidLevel, PyramidLevels};
use crate::window::{RasterWindow, RasterWindowRequest};

/// Chooses which pyramid level to decode for a visible window.
///
/// The policy compares how many raster pixels fall on one screen pixel:
///
/// ```text
/// ratio = max(window.width / screen.width, window.height / screen.height)
/// ```
///
/// At or below `1.0` (zoomed in past 1:1) the full-resolution level is used.
/// Above it, the coarsest level whose factor does not exceed
/// `ratio * oversample` is used, so the decoded buffer stays close to the
/// screen size instead of pulling full-resolution data for an overview.
///
/// Selection is monotonic in `ratio`: a larger visible window never yields a
/// finer level.
///
/// ```
/// use kurbo::Size;
/// use geoscope_pyramid::{LevelPolicy, PyramidLevels, RasterWindow};
///
/// let levels = PyramidLevels::default();
/// let policy = LevelPolicy::default();
/// let screen = Size::new(800.0, 600.0);
///
/// // 10000 raster columns on 800 screen columns: 12.5 pixels per screen pixel.
/// let level = policy.select(&levels, RasterWindow::full(10_000, 8_000), screen);
/// assert_eq!(level.factor(), 8);
///
/// // Zoomed in: a 400 pixel wide window on an 800 pixel screen.
/// let level = policy.select(&levels, RasterWindow::new(0, 0, 400, 300), screen);
/// assert_eq!(level.factor(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelPolicy {
    /// Scales the ratio before comparing it to level factors.
    ///
    /// Values below `1.0` prefer finer levels (sharper, more decoding);
    /// values above `1.0` prefer coarser levels.
    pub oversample: f64,
}

impl LevelPolicy {
    /// Creates a policy with the given oversampling bias.
    ///
    /// Non-finite or non-positive values fall back to `1.0`.
    #[must_use]
    pub fn new(oversample: f64) -> Self {
        let oversample = if oversample.is_finite() && oversample > 0.0 {
            oversample
        } else {
            1.0
        };
        Self { oversample }
    }

    /// Raster pixels per screen pixel along the more compressed axis.
    ///
    /// Returns `None` when the screen has no area.
    #[must_use]
    pub fn pixel_ratio(window: RasterWindow, screen: Size) -> Option<f64> {
        if !(screen.width > 0.0 && screen.height > 0.0) {
            return None;
        }
        let rx = f64::from(window.width) / screen.width;
        let ry = f64::from(window.height) / screen.height;
        Some(rx.max(ry))
    }

    /// Picks a level from `levels` for `window` shown on a `screen`-sized surface.
    ///
    /// A screen without area selects full resolution.
    #[must_use]
    pub fn select(
        &self,
        levels: &PyramidLevels,
        window: RasterWindow,
        screen: Size,
    ) -> PyramidLevel {
        let Some(ratio) = Self::pixel_ratio(window, screen) else {
            return levels.finest();
        };
        if ratio <= 1.0 {
            return levels.finest();
        }
        let threshold = ratio * self.oversample;
        levels
            .iter()
            .take_while(|level| f64::from(level.factor()) <= threshold)
            .last()
            .unwrap_or(levels.finest())
    }

    /// Builds the decode request for `window`.
    #[must_use]
    pub fn request(
        &self,
        levels: &PyramidLevels,
        window: RasterWindow,
        screen: Size,
    ) -> RasterWindowRequest {
        RasterWindowRequest::new(window, self.select(levels, window, screen))
    }
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self { oversample: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::LevelPolicy;
    use crate::{PyramidLevels, RasterWindow};

    const SCREEN: Size = Size::new(800.0, 600.0);

    #[test]
    fn zoomed_in_selects_full_resolution() {
        let levels = PyramidLevels::default();
        let window = RasterWindow::new(0, 0, 800, 600);
        let level = LevelPolicy::default().select(&levels, window, SCREEN);
        assert!(level.is_full_resolution());
    }

    #[test]
    fn zoomed_out_tracks_screen_size() {
        let levels = PyramidLevels::default();
        let policy = LevelPolicy::default();
        let level = policy.select(&levels, RasterWindow::new(0, 0, 1_700, 1_200), SCREEN);
        assert_eq!(level.factor(), 2, "ratio 2.125 picks factor 2");
        let decoded = level.decoded_len(1_700);
        assert!(decoded >= 800, "decoded width still covers the screen");
    }

    #[test]
    fn never_coarser_than_coarsest_level() {
        let levels = PyramidLevels::default();
        let window = RasterWindow::full(1_000_000, 10);
        let level = LevelPolicy::default().select(&levels, window, SCREEN);
        assert_eq!(level, levels.coarsest());
    }

    #[test]
    fn monotonic_in_window_size() {
        let levels = PyramidLevels::default();
        let policy = LevelPolicy::default();
        let mut previous = 0;
        for width in (50..40_000).step_by(37) {
            let height = width * 3 / 4;
            let factor = policy
                .select(&levels, RasterWindow::new(0, 0, width, height), SCREEN)
                .factor();
            assert!(factor >= previous, "width {width} went finer: {factor} < {previous}");
            previous = factor;
        }
        assert_eq!(previous, 16, "largest windows reach the coarsest level");
    }

    #[test]
    fn oversample_biases_choice() {
        let levels = PyramidLevels::default();
        let window = RasterWindow::new(0, 0, 3_300, 2_400);
        assert_eq!(LevelPolicy::new(1.0).select(&levels, window, SCREEN).factor(), 4);
        assert_eq!(LevelPolicy::new(0.5).select(&levels, window, SCREEN).factor(), 2);
        assert_eq!(LevelPolicy::new(-3.0), LevelPolicy::default());
    }

    #[test]
    fn degenerate_screen_selects_full_resolution() {
        let levels = PyramidLevels::default();
        let window = RasterWindow::full(100, 100);
        let level = LevelPolicy::default().select(&levels, window, Size::ZERO);
        assert!(level.is_full_resolution());
        assert!(LevelPolicy::pixel_ratio(RasterWindow::full(1, 1), Size::ZERO).is_none());
    }

    #[test]
    fn request_carries_window() {
        let levels = PyramidLevels::default();
        let window = RasterWindow::new(10, 20, 6_400, 4_800);
        let request = LevelPolicy::default().request(&levels, window, SCREEN);
        assert_eq!(request.window, window);
        assert_eq!(request.level.factor(), 8);
    }
}
