// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::time::Instant;

use geoscope_geo::{
    AffineGeoTransform, DataType, ImageMetadata, PixelFormat, ProjectionInfo, Reprojector,
};
use geoscope_pyramid::{PyramidLevel, PyramidLevels, RasterWindow, RasterWindowRequest};
use tiff::TiffResult;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::buffer::{PixelBuffer, expected_len};
use crate::error::{DecodeError, OpenError, PyramidError};
use crate::memory::percent;
use crate::reproject::{Proj4Reprojector, proj4_definition};
use crate::stretch::{Stretch, band_stretches, write_pixel};
use crate::{RasterOpener, RasterSource};

const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

/// `NewSubfileType` bit for a reduced-resolution copy of another image.
const REDUCED_RESOLUTION: u32 = 1;
/// `NewSubfileType` bit for a transparency mask.
const TRANSPARENCY_MASK: u32 = 4;

/// Opens (Geo)TIFF files as [`GeoTiffRaster`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoTiffOpener {
    pixel_format: PixelFormat,
}

impl GeoTiffOpener {
    /// Creates an opener producing `Gray8` buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pixel format of decoded buffers.
    #[must_use]
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Opens a TIFF held in memory. `name` only labels the raster and errors.
    ///
    /// # Errors
    ///
    /// As [`Self::open_reader`].
    pub fn open_bytes(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<GeoTiffRaster<Cursor<Vec<u8>>>, OpenError> {
        self.open_reader(name, Cursor::new(bytes))
    }

    /// Opens a TIFF from any seekable reader.
    ///
    /// Only the directories are read here: dimensions, georeferencing, and
    /// the reduced-resolution images that become pyramid levels. Pixels are
    /// decoded later, a strip or tile at a time.
    ///
    /// # Errors
    ///
    /// [`OpenError::Tiff`] when the reader does not hold a readable TIFF, and
    /// [`OpenError::Unsupported`] or [`OpenError::Empty`] for layouts that
    /// cannot be shown.
    pub fn open_reader<R: Read + Seek>(
        &self,
        name: &str,
        reader: R,
    ) -> Result<GeoTiffRaster<R>, OpenError> {
        let tiff_err = |source| OpenError::Tiff {
            path: name.into(),
            source,
        };
        let mut decoder = Decoder::new(reader).map_err(tiff_err)?;
        let (width, height) = decoder.dimensions().map_err(tiff_err)?;
        if width == 0 || height == 0 {
            return Err(OpenError::Empty { name: name.into() });
        }
        let bands = samples_per_pixel(&mut decoder);
        let planar = decoder
            .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)
            .ok()
            .flatten()
            .unwrap_or(1);
        if planar != 1 && bands > 1 {
            return Err(OpenError::Unsupported {
                name: name.into(),
                reason: "band-separate (planar) sample layout".into(),
            });
        }
        let data_type = data_type(&mut decoder);
        let geo_transform = read_geo_transform(&mut decoder);
        let epsg = read_epsg(&mut decoder);

        let mut levels = vec![TiffLevel {
            factor: 1,
            width,
            height,
            samples: LevelSamples::File { ifd: 0 },
        }];
        let mut ifd = 0;
        while decoder.more_images() {
            decoder.next_image().map_err(tiff_err)?;
            ifd += 1;
            if let Some(level) = overview_level(&mut decoder, ifd, width, height, bands)
                && levels.iter().all(|l| l.factor != level.factor)
            {
                levels.push(level);
            }
        }
        levels.sort_unstable_by_key(|level| level.factor);
        if ifd > 0 {
            decoder.seek_to_image(0).map_err(tiff_err)?;
        }

        let mut raster = GeoTiffRaster {
            name: name.into(),
            width,
            height,
            bands,
            data_type,
            file: RefCell::new(TiffFile {
                decoder,
                current_ifd: 0,
            }),
            levels,
            stretch: None,
            geo_transform,
            projection: ProjectionInfo::default(),
            reprojector: None,
            pixel_format: self.pixel_format,
        };
        raster.stretch = raster.initial_stretch();
        if let Some(epsg) = epsg {
            raster.projection = projection_info(epsg);
            match Proj4Reprojector::from_epsg(epsg) {
                Ok(reprojector) => raster.reprojector = Some(Box::new(reprojector)),
                Err(err) => tracing::warn!(raster = name, %err, "no reprojection for raster"),
            }
        }
        Ok(raster)
    }
}

impl RasterOpener for GeoTiffOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>, OpenError> {
        let started = Instant::now();
        let file = File::open(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();
        let raster = self.open_reader(&name, BufReader::new(file))?;
        tracing::info!(
            raster = %name,
            width = raster.width,
            height = raster.height,
            file_overviews = raster.levels.len() - 1,
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "opened GeoTIFF"
        );
        Ok(Box::new(raster))
    }
}

/// The decoder and the directory it currently points at.
struct TiffFile<R: Read + Seek> {
    decoder: Decoder<R>,
    current_ifd: usize,
}

impl<R: Read + Seek> TiffFile<R> {
    fn select(&mut self, ifd: usize) -> TiffResult<()> {
        if self.current_ifd != ifd {
            self.decoder.seek_to_image(ifd)?;
            self.current_ifd = ifd;
        }
        Ok(())
    }

    /// Chunk layout of the selected directory, a `width` x `height` image.
    fn layout(&self, width: u32, height: u32) -> ChunkLayout {
        let (chunk_width, chunk_height) = self.decoder.chunk_dimensions();
        ChunkLayout::new(width, height, chunk_width, chunk_height)
    }

    /// Decodes every chunk of directory `ifd` that `window` touches.
    fn read_chunks(
        &mut self,
        ifd: usize,
        width: u32,
        height: u32,
        window: RasterWindow,
    ) -> TiffResult<(ChunkLayout, HashMap<u32, DecodingResult>)> {
        self.select(ifd)?;
        let layout = self.layout(width, height);
        let mut chunks = HashMap::new();
        for index in layout.chunks_in(window) {
            chunks.insert(index, self.decoder.read_chunk(index)?);
        }
        Ok((layout, chunks))
    }
}

/// How an image is cut into strips or tiles.
///
/// Strips are tiles as wide as the image. Chunks are numbered row-major and
/// edge chunks hold only the pixels inside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChunkLayout {
    width: u32,
    height: u32,
    chunk_width: u32,
    chunk_height: u32,
    across: u32,
}

impl ChunkLayout {
    fn new(width: u32, height: u32, chunk_width: u32, chunk_height: u32) -> Self {
        let chunk_width = chunk_width.clamp(1, width.max(1));
        let chunk_height = chunk_height.clamp(1, height.max(1));
        Self {
            width,
            height,
            chunk_width,
            chunk_height,
            across: width.div_ceil(chunk_width),
        }
    }

    fn count(&self) -> u32 {
        self.across * self.height.div_ceil(self.chunk_height)
    }

    /// Top-left pixel and data size of chunk `index`.
    fn bounds(&self, index: u32) -> RasterWindow {
        let x = index % self.across * self.chunk_width;
        let y = index / self.across * self.chunk_height;
        RasterWindow::new(
            x,
            y,
            self.chunk_width.min(self.width - x),
            self.chunk_height.min(self.height - y),
        )
    }

    /// Chunk holding pixel `(x, y)` and the pixel's offset within it.
    fn locate(&self, x: u32, y: u32) -> (u32, usize) {
        let index = y / self.chunk_height * self.across + x / self.chunk_width;
        let bounds = self.bounds(index);
        let offset = (y - bounds.y) as usize * bounds.width as usize + (x - bounds.x) as usize;
        (index, offset)
    }

    /// Chunks overlapping a non-empty `window`.
    fn chunks_in(self, window: RasterWindow) -> impl Iterator<Item = u32> {
        let first_x = window.x / self.chunk_width;
        let last_x = (window.max_x() - 1) / self.chunk_width;
        let first_y = window.y / self.chunk_height;
        let last_y = (window.max_y() - 1) / self.chunk_height;
        (first_y..=last_y)
            .flat_map(move |cy| (first_x..=last_x).map(move |cx| cy * self.across + cx))
    }
}

/// Pixel-interleaved samples of one level, in the file's sample type.
#[derive(Debug)]
struct SampleGrid {
    width: u32,
    height: u32,
    data: DecodingResult,
}

enum LevelSamples {
    /// A directory of the file, decoded on demand.
    File { ifd: usize },
    /// An overview built by [`GeoTiffRaster::build_pyramids`].
    Built(SampleGrid),
}

struct TiffLevel {
    factor: u32,
    width: u32,
    height: u32,
    samples: LevelSamples,
}

/// A (Geo)TIFF read a strip or tile at a time.
///
/// Reduced-resolution images stored in the file become pyramid levels.
/// [`RasterSource::build_pyramids`] adds any missing factor in a single
/// streaming pass over the full-resolution chunks, keeping only the
/// downsampled samples. Samples stay in the file's type until they are
/// stretched to 8 bits.
///
/// The stretch comes from the full image once overviews have been built,
/// from the coarsest stored overview before that, and from the decoded window
/// itself when neither exists. Byte rasters are shown unstretched.
pub struct GeoTiffRaster<R: Read + Seek> {
    name: String,
    width: u32,
    height: u32,
    bands: usize,
    data_type: DataType,
    file: RefCell<TiffFile<R>>,
    levels: Vec<TiffLevel>,
    stretch: Option<Vec<Stretch>>,
    geo_transform: Option<AffineGeoTransform>,
    projection: ProjectionInfo,
    reprojector: Option<Box<dyn Reprojector>>,
    pixel_format: PixelFormat,
}

impl<R: Read + Seek> fmt::Debug for GeoTiffRaster<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoTiffRaster")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bands", &self.bands)
            .field("data_type", &self.data_type)
            .field(
                "factors",
                &self.levels.iter().map(|l| l.factor).collect::<Vec<_>>(),
            )
            .field("geo_transform", &self.geo_transform)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek> GeoTiffRaster<R> {
    fn level(&self, factor: u32) -> Option<&TiffLevel> {
        self.levels.iter().find(|level| level.factor == factor)
    }

    fn initial_stretch(&self) -> Option<Vec<Stretch>> {
        if self.data_type == DataType::Byte {
            return Some(vec![Stretch::new(0.0, 255.0); self.bands]);
        }
        let coarsest = self.levels.last().filter(|level| level.factor > 1)?;
        let LevelSamples::File { ifd } = coarsest.samples else {
            return None;
        };
        let window = RasterWindow::full(coarsest.width, coarsest.height);
        let mut file = self.file.borrow_mut();
        let stretch = file
            .read_chunks(ifd, coarsest.width, coarsest.height, window)
            .map(|(_, chunks)| {
                let samples = chunks
                    .values()
                    .flat_map(|data| (0..sample_len(data)).map(|i| sample_at(data, i)));
                band_stretches(self.bands, samples)
            })
            .inspect_err(|err| {
                tracing::warn!(raster = %self.name, %err, "could not read overview for stretch");
            })
            .ok();
        // Leave the decoder on full resolution.
        if file.select(0).is_err() {
            file.current_ifd = usize::MAX;
        }
        stretch
    }

    /// Stretches `level_window` of a level to display pixels.
    ///
    /// Positions past the level's edge repeat the last row or column, which
    /// covers stored overviews rounded down instead of up.
    fn encode(
        &self,
        level: &TiffLevel,
        level_window: RasterWindow,
        sample: impl Fn(u32, u32, usize) -> f64,
    ) -> Result<PixelBuffer, DecodeError> {
        let clamp = |x: u32, y: u32| (x.min(level.width - 1), y.min(level.height - 1));
        let local;
        let stretch = match &self.stretch {
            Some(stretch) => stretch,
            None => {
                let bands = self.bands;
                let samples = window_pixels(level_window)
                    .map(|(x, y)| clamp(x, y))
                    .flat_map(|(x, y)| (0..bands).map(move |b| (x, y, b)))
                    .map(|(x, y, b)| sample(x, y, b));
                local = band_stretches(bands, samples);
                &local
            }
        };
        let format = self.pixel_format;
        let mut bytes = vec![0; expected_len(level_window.width, level_window.height, format)];
        let pixels = bytes.chunks_exact_mut(format.bytes_per_pixel());
        for ((x, y), out) in window_pixels(level_window).zip(pixels) {
            let (x, y) = clamp(x, y);
            write_pixel(out, format, stretch, |b| sample(x, y, b));
        }
        PixelBuffer::new(level_window.width, level_window.height, format, bytes)
    }

    fn decode_file_level(
        &self,
        level: &TiffLevel,
        ifd: usize,
        level_window: RasterWindow,
    ) -> Result<PixelBuffer, DecodeError> {
        // Stored overviews may be a pixel short of the level grid.
        let clipped =
            RasterWindow::from_image_rect(level_window.to_rect(), level.width, level.height)
                .unwrap_or(RasterWindow::new(level.width - 1, level.height - 1, 1, 1));
        let (layout, chunks) = self
            .file
            .borrow_mut()
            .read_chunks(ifd, level.width, level.height, clipped)
            .map_err(|err| DecodeError::Backend(err.to_string()))?;
        tracing::trace!(
            raster = %self.name,
            factor = level.factor,
            chunks = chunks.len(),
            "decoded chunks"
        );
        let bands = self.bands;
        self.encode(level, level_window, |x, y, b| {
            let (index, offset) = layout.locate(x, y);
            chunks
                .get(&index)
                .map_or(f64::NAN, |data| sample_at(data, offset * bands + b))
        })
    }
}

impl<R: Read + Seek> RasterSource for GeoTiffRaster<R> {
    fn metadata(&self) -> ImageMetadata {
        let mut meta = ImageMetadata::new(self.name.clone(), self.width, self.height)
            .with_levels(PyramidLevels::from_factors(self.levels.iter().map(|l| l.factor)));
        if let Some(gt) = self.geo_transform {
            meta = meta.with_geo_transform(gt);
        }
        meta.file_type = "GTiff/GeoTIFF".into();
        meta.band_count = u32::try_from(self.bands).unwrap_or(u32::MAX);
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
        progress(0);
        if wanted.is_empty() && self.stretch.is_some() {
            progress(100);
            return Ok(());
        }

        let failed = |err: tiff::TiffError| PyramidError::Failed(err.to_string());
        let (width, height, bands) = (self.width, self.height, self.bands);
        let file = self.file.get_mut();
        file.select(0).map_err(failed)?;
        let layout = file.layout(width, height);
        let total = u64::from(layout.count());
        let mut stretch = vec![Stretch::EMPTY; bands];
        let mut grids: Vec<SampleGrid> = Vec::new();
        for index in 0..layout.count() {
            let data = file.decoder.read_chunk(index).map_err(failed)?;
            if grids.is_empty() {
                grids = wanted
                    .iter()
                    .map(|&f| {
                        let level = PyramidLevel::new(f).unwrap_or(PyramidLevel::FULL);
                        let (w, h) = (level.decoded_len(width), level.decoded_len(height));
                        SampleGrid::zeroed_like(&data, w, h, bands)
                    })
                    .collect();
            }
            // Chunk data is row-major over the chunk's own width.
            for (i, (x, y)) in window_pixels(layout.bounds(index)).enumerate() {
                for (b, s) in stretch.iter_mut().enumerate() {
                    s.include(sample_at(&data, i * bands + b));
                }
                for (grid, &f) in grids.iter_mut().zip(&wanted) {
                    if x % f == 0 && y % f == 0 {
                        let cell = (y / f) as usize * grid.width as usize + (x / f) as usize;
                        let at = cell * bands;
                        for b in 0..bands {
                            copy_sample(&mut grid.data, at + b, &data, i * bands + b);
                        }
                    }
                }
            }
            progress(percent(u64::from(index) + 1, total));
        }

        for (grid, factor) in grids.into_iter().zip(wanted.iter().copied()) {
            self.levels.push(TiffLevel {
                factor,
                width: grid.width,
                height: grid.height,
                samples: LevelSamples::Built(grid),
            });
        }
        self.levels.sort_unstable_by_key(|level| level.factor);
        if self.data_type != DataType::Byte {
            self.stretch = Some(stretch);
        }
        progress(100);
        tracing::debug!(raster = %self.name, factors = ?wanted, "built overviews");
        Ok(())
    }

    fn decode_window(&self, request: &RasterWindowRequest) -> Result<PixelBuffer, DecodeError> {
        if request.window.is_empty() || !request.window.fits_within(self.width, self.height) {
            return Err(DecodeError::OutOfBounds {
                window: request.window,
                width: self.width,
                height: self.height,
            });
        }
        let factor = request.level.factor();
        let level = self
            .level(factor)
            .ok_or(DecodeError::UndeclaredLevel(factor))?;
        let level_window = request.level_window();
        match &level.samples {
            LevelSamples::File { ifd } => self.decode_file_level(level, *ifd, level_window),
            LevelSamples::Built(grid) => {
                let bands = self.bands;
                self.encode(level, level_window, |x, y, b| {
                    let at = (y as usize * grid.width as usize + x as usize) * bands + b;
                    sample_at(&grid.data, at)
                })
            }
        }
    }

    fn geo_transform(&self) -> Option<AffineGeoTransform> {
        self.geo_transform
    }

    fn reprojector(&self) -> Option<&dyn Reprojector> {
        self.reprojector.as_deref()
    }
}

impl SampleGrid {
    fn zeroed_like(data: &DecodingResult, width: u32, height: u32, bands: usize) -> Self {
        let len = width as usize * height as usize * bands;
        let data = match data {
            DecodingResult::U8(_) => DecodingResult::U8(vec![0; len]),
            DecodingResult::U16(_) => DecodingResult::U16(vec![0; len]),
            DecodingResult::U32(_) => DecodingResult::U32(vec![0; len]),
            DecodingResult::U64(_) => DecodingResult::U64(vec![0; len]),
            DecodingResult::F32(_) => DecodingResult::F32(vec![0.0; len]),
            DecodingResult::F64(_) => DecodingResult::F64(vec![0.0; len]),
            DecodingResult::I8(_) => DecodingResult::I8(vec![0; len]),
            DecodingResult::I16(_) => DecodingResult::I16(vec![0; len]),
            DecodingResult::I32(_) => DecodingResult::I32(vec![0; len]),
            DecodingResult::I64(_) => DecodingResult::I64(vec![0; len]),
        };
        Self {
            width,
            height,
            data,
        }
    }
}

/// Row-major pixel positions of `window`.
fn window_pixels(window: RasterWindow) -> impl Iterator<Item = (u32, u32)> {
    (window.y..window.max_y()).flat_map(move |y| (window.x..window.max_x()).map(move |x| (x, y)))
}

fn sample_len(data: &DecodingResult) -> usize {
    match data {
        DecodingResult::U8(v) => v.len(),
        DecodingResult::U16(v) => v.len(),
        DecodingResult::U32(v) => v.len(),
        DecodingResult::U64(v) => v.len(),
        DecodingResult::F32(v) => v.len(),
        DecodingResult::F64(v) => v.len(),
        DecodingResult::I8(v) => v.len(),
        DecodingResult::I16(v) => v.len(),
        DecodingResult::I32(v) => v.len(),
        DecodingResult::I64(v) => v.len(),
    }
}

/// Sample `i` as `f64`; `NaN` past the end.
fn sample_at(data: &DecodingResult, i: usize) -> f64 {
    match data {
        DecodingResult::U8(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::U16(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::U32(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::U64(v) => v.get(i).map_or(f64::NAN, |&s| s as f64),
        DecodingResult::F32(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::F64(v) => v.get(i).copied().unwrap_or(f64::NAN),
        DecodingResult::I8(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::I16(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::I32(v) => v.get(i).map_or(f64::NAN, |&s| f64::from(s)),
        DecodingResult::I64(v) => v.get(i).map_or(f64::NAN, |&s| s as f64),
    }
}

/// Copies sample `from` of `src` into slot `to` of `dst` when both hold the
/// same sample type.
fn copy_sample(dst: &mut DecodingResult, to: usize, src: &DecodingResult, from: usize) {
    fn copy<T: Copy>(dst: &mut [T], to: usize, src: &[T], from: usize) {
        if let (Some(slot), Some(&v)) = (dst.get_mut(to), src.get(from)) {
            *slot = v;
        }
    }
    match (dst, src) {
        (DecodingResult::U8(d), DecodingResult::U8(s)) => copy(d, to, s, from),
        (DecodingResult::U16(d), DecodingResult::U16(s)) => copy(d, to, s, from),
        (DecodingResult::U32(d), DecodingResult::U32(s)) => copy(d, to, s, from),
        (DecodingResult::U64(d), DecodingResult::U64(s)) => copy(d, to, s, from),
        (DecodingResult::F32(d), DecodingResult::F32(s)) => copy(d, to, s, from),
        (DecodingResult::F64(d), DecodingResult::F64(s)) => copy(d, to, s, from),
        (DecodingResult::I8(d), DecodingResult::I8(s)) => copy(d, to, s, from),
        (DecodingResult::I16(d), DecodingResult::I16(s)) => copy(d, to, s, from),
        (DecodingResult::I32(d), DecodingResult::I32(s)) => copy(d, to, s, from),
        (DecodingResult::I64(d), DecodingResult::I64(s)) => copy(d, to, s, from),
        _ => {}
    }
}

fn samples_per_pixel<R: Read + Seek>(decoder: &mut Decoder<R>) -> usize {
    decoder
        .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)
        .ok()
        .flatten()
        .map_or(1, |n| usize::from(n.max(1)))
}

fn data_type<R: Read + Seek>(decoder: &mut Decoder<R>) -> DataType {
    let mut first = |tag| {
        decoder
            .find_tag_unsigned_vec::<u16>(tag)
            .ok()
            .flatten()
            .and_then(|v| v.first().copied())
    };
    let bits = first(Tag::BitsPerSample).unwrap_or(1);
    let format = first(Tag::SampleFormat).unwrap_or(1);
    match (format, bits) {
        (1, 8) => DataType::Byte,
        (1, 16) => DataType::UInt16,
        (2, 16) => DataType::Int16,
        (1, 32) => DataType::UInt32,
        (2, 32) => DataType::Int32,
        (3, 32) => DataType::Float32,
        (3, 64) => DataType::Float64,
        _ => DataType::Unknown,
    }
}

/// The directory `decoder` points at as a pyramid level, if it is a
/// reduced-resolution copy of a `width` x `height` image.
fn overview_level<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    ifd: usize,
    width: u32,
    height: u32,
    bands: usize,
) -> Option<TiffLevel> {
    let subfile = decoder
        .find_tag_unsigned::<u32>(Tag::NewSubfileType)
        .ok()
        .flatten()
        .unwrap_or(0);
    if subfile & REDUCED_RESOLUTION == 0 || subfile & TRANSPARENCY_MASK != 0 {
        return None;
    }
    if samples_per_pixel(decoder) != bands {
        return None;
    }
    let (w, h) = decoder.dimensions().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    let factor = (width + w / 2) / w;
    let matches = |full: u32, len: u32| len == full.div_ceil(factor) || len == full / factor;
    (factor >= 2 && matches(width, w) && matches(height, h)).then_some(TiffLevel {
        factor,
        width: w,
        height: h,
        samples: LevelSamples::File { ifd },
    })
}

fn f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Option<Vec<f64>> {
    decoder.find_tag(tag).ok().flatten()?.into_f64_vec().ok()
}

/// Georeferencing from the GeoTIFF model tags, if present.
fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<AffineGeoTransform> {
    if let Some(m) = f64_tag(decoder, Tag::ModelTransformationTag) {
        let matrix: [f64; 16] = m.get(..16)?.try_into().ok()?;
        return Some(AffineGeoTransform::from_model_transformation(matrix));
    }
    let scale = f64_tag(decoder, Tag::ModelPixelScaleTag)?;
    let tiepoint = f64_tag(decoder, Tag::ModelTiepointTag)?;
    let scale: [f64; 3] = scale.get(..3)?.try_into().ok()?;
    let tiepoint: [f64; 6] = tiepoint.get(..6)?.try_into().ok()?;
    Some(AffineGeoTransform::from_tiepoint(tiepoint, scale))
}

/// EPSG code from the GeoKey directory: projected CRS first, then geographic.
fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u16> {
    let keys = decoder
        .find_tag(Tag::GeoKeyDirectoryTag)
        .ok()
        .flatten()?
        .into_u16_vec()
        .ok()?;
    epsg_from_geo_keys(&keys)
}

/// Looks up an inline EPSG code in a raw GeoKey directory.
///
/// The directory is a 4-value header followed by `(id, location, count,
/// value)` entries; `location == 0` means the value is inline.
fn epsg_from_geo_keys(keys: &[u16]) -> Option<u16> {
    let count = usize::from(*keys.get(3)?);
    let entries: Vec<&[u16]> = keys.get(4..)?.chunks_exact(4).take(count).collect();
    let lookup = |wanted: u16| {
        entries
            .iter()
            .find(|e| e[0] == wanted && e[1] == 0)
            .map(|e| e[3])
            // 32767 is "user-defined" in GeoTIFF.
            .filter(|&code| code != 0 && code != 32767)
    };
    lookup(PROJECTED_CS_TYPE_GEO_KEY).or_else(|| lookup(GEOGRAPHIC_TYPE_GEO_KEY))
}

fn projection_info(epsg: u16) -> ProjectionInfo {
    let definition = proj4_definition(epsg).unwrap_or_default();
    let unit = if definition.contains("+proj=longlat") {
        "degree"
    } else if definition.contains("+units=us-ft") {
        "US survey foot"
    } else if definition.contains("+units=ft") {
        "foot"
    } else {
        "metre"
    };
    ProjectionInfo {
        name: format!("EPSG:{epsg}"),
        unit: unit.into(),
        epsg: Some(epsg),
    }
}
