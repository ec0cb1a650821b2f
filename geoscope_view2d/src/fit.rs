// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fit-to-frame geometry.
//!
//! A raster is fit by scaling its base size uniformly until the limiting
//! axis matches the screen. For georeferenced rasters the base is the shared
//! canvas measured at the raster's current pixels-per-world-unit, and the
//! raster is placed inside the fitted canvas at its geographic offset.

use geoscope_geo::{CanvasExtent, GeoExtent, ImageMetadata};
use kurbo::{Size, Vec2};

/// Metadata that cannot be fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// A size or extent that fitting depends on is zero or degenerate.
    #[error("cannot fit raster: {0}")]
    InvalidMetadata(&'static str),
}

/// Result of fitting one raster to a screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOutcome {
    /// New on-screen size of the raster in content pixels.
    pub viewer_size: Size,
    /// Offset of the raster inside the canvas; zero without a geo extent.
    pub margin: Vec2,
    /// Size of the whole canvas in content pixels.
    pub canvas_size: Size,
    /// Content pixels per world unit after the fit, for georeferenced rasters.
    pub pixels_per_unit: Option<Vec2>,
}

impl FitOutcome {
    /// Writes the viewer size and margin into `meta`.
    pub fn apply_to(&self, meta: &mut ImageMetadata) {
        meta.set_viewer_size(self.viewer_size);
        if let Some(extent) = meta.geo_extent.as_mut() {
            extent.set_margin(self.margin);
        }
    }
}

fn is_positive(size: Size) -> bool {
    size.is_finite() && size.width > 0.0 && size.height > 0.0
}

fn uniform_fit(base: Size, screen: Size) -> f64 {
    (screen.width / base.width).min(screen.height / base.height)
}

/// Current content-pixels-per-world-unit of a georeferenced raster.
fn pixels_per_unit(viewer: Size, extent: &GeoExtent) -> Vec2 {
    Vec2::new(viewer.width / extent.width(), viewer.height / extent.height())
}

/// Fits `meta` into `screen`.
///
/// `canvas` defaults to the raster's own extent. The outcome is computed
/// without touching `meta`; apply it with [`FitOutcome::apply_to`].
///
/// # Errors
///
/// [`FitError::InvalidMetadata`] for a zero-sized raster, a non-positive
/// viewer size, an empty screen, or a degenerate extent or canvas.
pub fn fit_to_screen(
    meta: &ImageMetadata,
    canvas: Option<&CanvasExtent>,
    screen: Size,
) -> Result<FitOutcome, FitError> {
    if !meta.has_valid_size() {
        return Err(FitError::InvalidMetadata("raster has zero width or height"));
    }
    let viewer = meta.viewer_size();
    if !is_positive(viewer) {
        return Err(FitError::InvalidMetadata("viewer size is not positive"));
    }
    if !is_positive(screen) {
        return Err(FitError::InvalidMetadata("screen size is empty"));
    }

    let Some(extent) = meta.geo_extent else {
        let base = meta.image_size();
        let scale = uniform_fit(base, screen);
        let viewer_size = base * scale;
        return Ok(FitOutcome {
            viewer_size,
            margin: Vec2::ZERO,
            canvas_size: viewer_size,
            pixels_per_unit: None,
        });
    };

    if extent.is_degenerate() {
        return Err(FitError::InvalidMetadata("geo extent is degenerate"));
    }
    let canvas = canvas.copied().unwrap_or_else(|| CanvasExtent::from_extent(&extent));
    if canvas.is_degenerate() {
        return Err(FitError::InvalidMetadata("canvas extent is degenerate"));
    }

    let ppu = pixels_per_unit(viewer, &extent);
    let canvas_pixels = Size::new(canvas.width() * ppu.x, canvas.height() * ppu.y);
    let scale = uniform_fit(canvas_pixels, screen);
    let ppu = ppu * scale;

    let mut placed = extent;
    placed.calculate_margin(&canvas, ppu);
    Ok(FitOutcome {
        viewer_size: Size::new(extent.width() * ppu.x, extent.height() * ppu.y),
        margin: placed.margin(),
        canvas_size: canvas_pixels * scale,
        pixels_per_unit: Some(ppu),
    })
}

/// Size of the canvas in content pixels at the raster's current viewer size.
///
/// Without a geo extent this is the viewer size itself.
#[must_use]
pub fn canvas_pixel_size(meta: &ImageMetadata, canvas: Option<&CanvasExtent>) -> Size {
    let viewer = meta.viewer_size();
    match meta.geo_extent {
        Some(extent) if !extent.is_degenerate() => {
            let canvas = canvas.copied().unwrap_or_else(|| CanvasExtent::from_extent(&extent));
            let ppu = pixels_per_unit(viewer, &extent);
            Size::new(canvas.width() * ppu.x, canvas.height() * ppu.y)
        }
        _ => viewer,
    }
}

/// Translation that centers `content` in `screen`.
///
/// Content larger than the screen gets a negative translation with equal
/// overflow on both sides.
#[must_use]
pub fn center_in_screen(content: Size, screen: Size) -> Vec2 {
    Vec2::new(
        (screen.width - content.width) / 2.0,
        (screen.height - content.height) / 2.0,
    )
}
