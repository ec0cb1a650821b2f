// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use geoscope_geo::{
    AffineGeoTransform, DataType, ImageMetadata, PixelFormat, ProjectionInfo, Reprojector,
};
use geoscope_pyramid::{PyramidLevel, PyramidLevels, RasterWindowRequest};

use crate::RasterSource;
use crate::buffer::{PixelBuffer, expected_len};
use crate::error::{DecodeError, OpenError, PyramidError};
use crate::stretch::{Stretch, band_stretches, write_pixel};

/// One decoded pyramid level: pixel-interleaved samples at `1/factor` scale.
#[derive(Clone, Debug)]
struct Level {
    factor: u32,
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

/// A raster held entirely in memory.
///
/// Samples are `f32`, pixel-interleaved (all bands of a pixel are adjacent),
/// rows top to bottom. Overviews are built by nearest-neighbour sampling and
/// decoded pixels are linearly stretched from each band's full-resolution
/// min/max onto 8 bits.
///
/// `MemoryRaster` backs tests and demos. Files go through
/// [`crate::GeoTiffRaster`] instead, which never holds a whole image.
pub struct MemoryRaster {
    name: String,
    file_type: String,
    bands: u32,
    data_type: DataType,
    levels: Vec<Level>,
    stretch: Vec<Stretch>,
    geo_transform: Option<AffineGeoTransform>,
    projection: ProjectionInfo,
    reprojector: Option<Box<dyn Reprojector>>,
    pixel_format: PixelFormat,
}

impl fmt::Debug for MemoryRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRaster")
            .field("name", &self.name)
            .field("bands", &self.bands)
            .field("data_type", &self.data_type)
            .field(
                "factors",
                &self.levels.iter().map(|l| l.factor).collect::<Vec<_>>(),
            )
            .field("geo_transform", &self.geo_transform)
            .field("pixel_format", &self.pixel_format)
            .finish_non_exhaustive()
    }
}

impl MemoryRaster {
    /// Wraps pixel-interleaved samples of a `width` x `height` raster.
    ///
    /// # Errors
    ///
    /// [`OpenError::Empty`] for a zero-sized raster or zero bands, and
    /// [`OpenError::Unsupported`] when `samples` has the wrong length.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        bands: u32,
        samples: Vec<f32>,
    ) -> Result<Self, OpenError> {
        let name = name.into();
        if width == 0 || height == 0 || bands == 0 {
            return Err(OpenError::Empty { name });
        }
        let expected = width as usize * height as usize * bands as usize;
        if samples.len() != expected {
            return Err(OpenError::Unsupported {
                name,
                reason: format!("expected {expected} samples, found {}", samples.len()),
            });
        }
        let stretch = band_stretches(bands as usize, samples.iter().map(|&v| f64::from(v)));
        Ok(Self {
            name,
            file_type: "MEM/In Memory Raster".into(),
            bands,
            data_type: DataType::Float32,
            levels: vec![Level {
                factor: 1,
                width,
                height,
                samples,
            }],
            stretch,
            geo_transform: None,
            projection: ProjectionInfo::default(),
            reprojector: None,
            pixel_format: PixelFormat::Gray8,
        })
    }

    /// Builds a raster by evaluating `sample(x, y, band)` for every sample.
    ///
    /// # Errors
    ///
    /// As [`MemoryRaster::new`].
    pub fn from_fn(
        name: impl Into<String>,
        width: u32,
        height: u32,
        bands: u32,
        mut sample: impl FnMut(u32, u32, u32) -> f32,
    ) -> Result<Self, OpenError> {
        let mut samples = Vec::with_capacity(width as usize * height as usize * bands as usize);
        for y in 0..height {
            for x in 0..width {
                for band in 0..bands {
                    samples.push(sample(x, y, band));
                }
            }
        }
        Self::new(name, width, height, bands, samples)
    }

    /// Sets the georeferencing.
    #[must_use]
    pub fn with_geo_transform(mut self, geo_transform: AffineGeoTransform) -> Self {
        self.geo_transform = Some(geo_transform);
        self
    }

    /// Sets the CRS description.
    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionInfo) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the reprojector used for geographic readouts.
    #[must_use]
    pub fn with_reprojector(mut self, reprojector: impl Reprojector + 'static) -> Self {
        self.reprojector = Some(Box::new(reprojector));
        self
    }

    /// Sets the output pixel format.
    #[must_use]
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Records the sample type the data originally had.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets the driver name reported in the metadata.
    #[must_use]
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = file_type.into();
        self
    }

    fn full(&self) -> &Level {
        &self.levels[0]
    }

    fn level(&self, factor: u32) -> Option<&Level> {
        self.levels.iter().find(|level| level.factor == factor)
    }

    fn declared_levels(&self) -> PyramidLevels {
        PyramidLevels::from_factors(self.levels.iter().map(|level| level.factor))
    }

    fn downsample(
        &self,
        factor: u32,
        rows_done: &mut u64,
        total_rows: u64,
        progress: &mut dyn FnMut(u8),
    ) -> Level {
        let full = self.full();
        let bands = self.bands as usize;
        let level = PyramidLevel::new(factor).unwrap_or(PyramidLevel::FULL);
        let width = level.decoded_len(full.width);
        let height = level.decoded_len(full.height);
        let mut samples = Vec::with_capacity(width as usize * height as usize * bands);
        for oy in 0..height {
            let src_row = (oy * factor) as usize * full.width as usize;
            for ox in 0..width {
                let src = (src_row + (ox * factor) as usize) * bands;
                samples.extend_from_slice(&full.samples[src..src + bands]);
            }
            *rows_done += 1;
            progress(percent(*rows_done, total_rows));
        }
        Level {
            factor,
            width,
            height,
            samples,
        }
    }

    fn encode(
        &self,
        level: &Level,
        request: &RasterWindowRequest,
    ) -> Result<PixelBuffer, DecodeError> {
        let window = request.level_window();
        let bands = self.bands as usize;
        let format = self.pixel_format;
        let mut bytes = vec![0; expected_len(window.width, window.height, format)];
        let mut pixels = bytes.chunks_exact_mut(format.bytes_per_pixel());
        for y in window.y..window.max_y() {
            let row = y as usize * level.width as usize;
            for x in window.x..window.max_x() {
                let start = (row + x as usize) * bands;
                let px = &level.samples[start..start + bands];
                if let Some(out) = pixels.next() {
                    write_pixel(out, format, &self.stretch, |b| f64::from(px[b]));
                }
            }
        }
        PixelBuffer::new(window.width, window.height, format, bytes)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the quotient is at most 100"
)]
pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

impl RasterSource for MemoryRaster {
    fn metadata(&self) -> ImageMetadata {
        let full = self.full();
        let mut meta = ImageMetadata::new(self.name.clone(), full.width, full.height)
            .with_levels(self.declared_levels());
        if let Some(gt) = self.geo_transform {
            meta = meta.with_geo_transform(gt);
        }
        meta.file_type = self.file_type.clone();
        meta.band_count = self.bands;
        meta.data_type = self.data_type;
        meta.projection = self.projection.clone();
        meta.pixel_format = self.pixel_format;
        meta
    }

    fn build_pyramids(
        &mut self,
        factors: &[u32],
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), PyramidError> {
        if let Some(&bad) = factors.iter().find(|&&f| f < 2) {
            return Err(PyramidError::InvalidFactor(bad));
        }
        let mut wanted: Vec<u32> = factors
            .iter()
            .copied()
            .filter(|&f| self.level(f).is_none())
            .collect();
        wanted.sort_unstable();
        wanted.dedup();

        let full = self.full();
        let total_rows: u64 = wanted
            .iter()
            .map(|&f| u64::from(full.height.div_ceil(f)))
            .sum();
        let mut rows_done = 0;
        progress(0);
        let mut built = Vec::with_capacity(wanted.len());
        for &factor in &wanted {
            built.push(self.downsample(factor, &mut rows_done, total_rows, progress));
        }
        self.levels.extend(built);
        self.levels.sort_unstable_by_key(|level| level.factor);
        progress(100);
        tracing::debug!(
            raster = %self.name,
            factors = ?wanted,
            "built overviews"
        );
        Ok(())
    }

    fn decode_window(&self, request: &RasterWindowRequest) -> Result<PixelBuffer, DecodeError> {
        let full = self.full();
        if request.window.is_empty() || !request.window.fits_within(full.width, full.height) {
            return Err(DecodeError::OutOfBounds {
                window: request.window,
                width: full.width,
                height: full.height,
            });
        }
        let factor = request.level.factor();
        let level = self
            .level(factor)
            .ok_or(DecodeError::UndeclaredLevel(factor))?;
        self.encode(level, request)
    }

    fn geo_transform(&self) -> Option<AffineGeoTransform> {
        self.geo_transform
    }

    fn reprojector(&self) -> Option<&dyn Reprojector> {
        self.reprojector.as_deref()
    }
}
