// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use geoscope_geo::PixelFormat;
use geoscope_pyramid::LevelPolicy;

/// Tunables for a [`ViewportController`](crate::ViewportController).
///
/// Defaults match the classic desktop viewer: the wheel zooms by `1/0.7`
/// and `0.7`, the toolbar by `1.1`, and overviews are built at factors
/// 2, 4, 8 and 16.
///
/// Zoom limits are relative to the fitted size: `1.0` is the raster fitted
/// to the screen, `0.5` half that, `4.0` four times it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewerConfig {
    /// Content scale applied by one wheel step towards the user.
    pub zoom_in_rate: f64,
    /// Content scale applied by one wheel step away from the user.
    pub zoom_out_rate: f64,
    /// View scale applied by the zoom-in toolbar action (its inverse zooms out).
    pub toolbar_zoom_factor: f64,
    min_zoom: f64,
    max_zoom: f64,
    /// Overview factors requested when a raster is opened.
    pub overview_factors: Vec<u32>,
    /// Resolution-level selection.
    pub level_policy: LevelPolicy,
    /// Pixel format asked of openers.
    pub pixel_format: PixelFormat,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_in_rate: 1.0 / 0.7,
            zoom_out_rate: 0.7,
            toolbar_zoom_factor: 1.1,
            min_zoom: 0.25,
            max_zoom: 256.0,
            overview_factors: vec![2, 4, 8, 16],
            level_policy: LevelPolicy::default(),
            pixel_format: PixelFormat::Gray8,
        }
    }
}

impl ViewerConfig {
    /// Smallest zoom relative to the fitted size.
    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Largest zoom relative to the fitted size.
    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Sets the zoom limits.
    ///
    /// The pair is reordered if `min > max`. Non-finite or non-positive values
    /// keep the current limit.
    pub fn set_zoom_limits(&mut self, min: f64, max: f64) {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        let min = if valid(min) { min } else { self.min_zoom };
        let max = if valid(max) { max } else { self.max_zoom };
        if min <= max {
            self.min_zoom = min;
            self.max_zoom = max;
        } else {
            self.min_zoom = max;
            self.max_zoom = min;
        }
    }

    /// Returns `true` if `zoom` lies within the limits.
    #[must_use]
    pub fn allows_zoom(&self, zoom: f64) -> bool {
        // Tolerate rounding drift after repeated rate multiplications.
        const EPS: f64 = 1e-9;
        zoom >= self.min_zoom * (1.0 - EPS) && zoom <= self.max_zoom * (1.0 + EPS)
    }

    /// Builder form of [`Self::set_zoom_limits`].
    #[must_use]
    pub fn with_zoom_limits(mut self, min: f64, max: f64) -> Self {
        self.set_zoom_limits(min, max);
        self
    }

    /// Sets the wheel rates. Rates that are not finite and positive are ignored.
    #[must_use]
    pub fn with_zoom_rates(mut self, zoom_in: f64, zoom_out: f64) -> Self {
        if zoom_in.is_finite() && zoom_in > 0.0 {
            self.zoom_in_rate = zoom_in;
        }
        if zoom_out.is_finite() && zoom_out > 0.0 {
            self.zoom_out_rate = zoom_out;
        }
        self
    }

    /// Sets the toolbar zoom factor. Invalid factors are ignored.
    #[must_use]
    pub fn with_toolbar_zoom_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.toolbar_zoom_factor = factor;
        }
        self
    }

    /// Sets the overview factors built on open.
    #[must_use]
    pub fn with_overview_factors(mut self, factors: impl IntoIterator<Item = u32>) -> Self {
        self.overview_factors = factors.into_iter().collect();
        self
    }

    /// Sets the level selection policy.
    #[must_use]
    pub fn with_level_policy(mut self, policy: LevelPolicy) -> Self {
        self.level_policy = policy;
        self
    }

    /// Sets the pixel format asked of openers.
    #[must_use]
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Wheel rate for a wheel delta: positive zooms in, anything else out.
    #[must_use]
    pub fn wheel_rate(&self, delta: f64) -> f64 {
        if delta > 0.0 {
            self.zoom_in_rate
        } else {
            self.zoom_out_rate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerConfig;

    #[test]
    fn defaults_match_classic_viewer() {
        let config = ViewerConfig::default();
        assert!((config.zoom_in_rate * 0.7 - 1.0).abs() < 1e-12);
        assert_eq!(config.zoom_out_rate, 0.7);
        assert_eq!(config.toolbar_zoom_factor, 1.1);
        assert_eq!(config.overview_factors, [2, 4, 8, 16]);
    }

    #[test]
    fn zoom_limits_are_normalized() {
        let mut config = ViewerConfig::default();
        config.set_zoom_limits(8.0, 0.5);
        assert_eq!((config.min_zoom(), config.max_zoom()), (0.5, 8.0));

        config.set_zoom_limits(f64::NAN, -1.0);
        assert_eq!((config.min_zoom(), config.max_zoom()), (0.5, 8.0));

        assert!(config.allows_zoom(0.5));
        assert!(config.allows_zoom(8.0));
        assert!(!config.allows_zoom(8.1));
        assert!(!config.allows_zoom(0.49));
    }

    #[test]
    fn wheel_direction_picks_rate() {
        let config = ViewerConfig::default().with_zoom_rates(2.0, 0.5);
        assert_eq!(config.wheel_rate(120.0), 2.0);
        assert_eq!(config.wheel_rate(-120.0), 0.5);
        assert_eq!(config.wheel_rate(0.0), 0.5);
    }

    #[test]
    fn invalid_builder_values_are_ignored() {
        let config = ViewerConfig::default()
            .with_zoom_rates(0.0, f64::INFINITY)
            .with_toolbar_zoom_factor(-2.0);
        assert_eq!(config, ViewerConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "overview_factors": [2, 4], "min_zoom": 0.5 }"#).unwrap();
        assert_eq!(config.overview_factors, [2, 4]);
        assert_eq!(config.min_zoom(), 0.5);
        assert_eq!(config.zoom_out_rate, 0.7);
    }
}
