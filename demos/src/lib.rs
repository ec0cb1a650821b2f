// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the Geoscope demos.

use std::error::Error;
use std::path::Path;

use geoscope_geo::{AffineGeoTransform, ProjectionInfo};
use geoscope_source::{MemoryRaster, OpenError, Proj4Reprojector};
use geoscope_viewport::ViewerConfig;
use tracing_subscriber::{EnvFilter, fmt};

/// EPSG code of the synthetic rasters: WGS 84 / UTM zone 52N.
pub const SYNTHETIC_EPSG: u16 = 32652;

/// Installs a `tracing` subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Loads a [`ViewerConfig`] from JSON. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<ViewerConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// A georeferenced test raster: 30 m UTM pixels with its upper-left corner at
/// `(easting, northing)`, showing rings around the center on a gradient.
pub fn synthetic_raster(
    name: &str,
    width: u32,
    height: u32,
    easting: f64,
    northing: f64,
) -> Result<MemoryRaster, OpenError> {
    let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let raster = MemoryRaster::from_fn(name, width, height, 1, |x, y, _| {
        let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
        let ring = ((dx * dx + dy * dy).sqrt() / 40.0).sin() * 64.0;
        (f64::from(x + y) / f64::from(width + height) * 160.0 + ring) as f32
    })?
    .with_file_type("synthetic")
    .with_geo_transform(AffineGeoTransform::north_up(easting, northing, 30.0, -30.0))
    .with_projection(ProjectionInfo {
        name: format!("EPSG:{SYNTHETIC_EPSG}"),
        unit: "metre".into(),
        epsg: Some(SYNTHETIC_EPSG),
    });
    Ok(match Proj4Reprojector::from_epsg(SYNTHETIC_EPSG) {
        Ok(reprojector) => raster.with_reprojector(reprojector),
        Err(err) => {
            tracing::warn!(%err, "synthetic raster has no reprojection");
            raster
        }
    })
}
