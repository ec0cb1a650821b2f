// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning raw band samples into 8-bit display pixels.

use geoscope_geo::PixelFormat;

/// Linear stretch of one band's sample range onto `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stretch {
    min: f64,
    max: f64,
}

impl Stretch {
    /// A stretch that has seen no samples yet.
    pub(crate) const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub(crate) const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widens the range to include `v`. Non-finite samples are ignored.
    pub(crate) fn include(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the value is rounded and clamped to 0..=255 first"
    )]
    pub(crate) fn apply(self, v: f64) -> u8 {
        if !v.is_finite() {
            return 0;
        }
        let range = self.max - self.min;
        let scaled = if range > 0.0 {
            (v - self.min) / range * 255.0
        } else {
            // Flat band: show the raw value.
            v
        };
        scaled.round().clamp(0.0, 255.0) as u8
    }
}

/// Per-band stretches over pixel-interleaved `samples`.
pub(crate) fn band_stretches(bands: usize, samples: impl IntoIterator<Item = f64>) -> Vec<Stretch> {
    let mut stretches = vec![Stretch::EMPTY; bands];
    for (i, v) in samples.into_iter().enumerate() {
        stretches[i % bands].include(v);
    }
    stretches
}

/// Writes one pixel into `out`, which is `format.bytes_per_pixel()` long.
///
/// `sample(band)` reads the pixel's bands. Rasters with three or more bands
/// show the first three as red, green, and blue; anything else is gray.
pub(crate) fn write_pixel(
    out: &mut [u8],
    format: PixelFormat,
    stretch: &[Stretch],
    sample: impl Fn(usize) -> f64,
) {
    let band = |b: usize| stretch.get(b).map_or(0, |s| s.apply(sample(b)));
    let gray = band(0);
    let rgb = if stretch.len() >= 3 {
        [gray, band(1), band(2)]
    } else {
        [gray; 3]
    };
    match format {
        PixelFormat::Gray8 => out[0] = gray,
        PixelFormat::Rgb8 => out[..3].copy_from_slice(&rgb),
        PixelFormat::Rgba8 => {
            out[..3].copy_from_slice(&rgb);
            out[3] = u8::MAX;
        }
    }
}
