// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opening GeoTIFFs written by the `tiff` encoder.

use std::cell::Cell;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::rc::Rc;

use geoscope_geo::{DataType, PixelFormat};
use geoscope_pyramid::{PyramidLevel, RasterWindow, RasterWindowRequest};
use geoscope_source::{GeoTiffOpener, OpenError, RasterOpener, RasterSource};
use kurbo::Point;
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

const WIDTH: u32 = 40;
const HEIGHT: u32 = 30;

/// A UTM zone 52N raster with 30 m pixels and an east-west gradient
/// (`x * 100`), cut into strips of `rows_per_strip` rows.
///
/// With `overview`, a half-size reduced-resolution image follows holding the
/// reversed gradient, so reads from it are easy to tell apart.
fn utm_geotiff(rows_per_strip: u32, overview: bool) -> Vec<u8> {
    let data: Vec<u16> = (0..HEIGHT)
        .flat_map(|_| (0..WIDTH).map(|x| u16::try_from(x * 100).unwrap()))
        .collect();
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray16>(WIDTH, HEIGHT)
            .unwrap();
        image.rows_per_strip(rows_per_strip).unwrap();
        let dir = image.encoder();
        dir.write_tag(Tag::ModelPixelScaleTag, &[30.0_f64, 30.0, 0.0][..])
            .unwrap();
        dir.write_tag(
            Tag::ModelTiepointTag,
            &[0.0_f64, 0.0, 0.0, 500_000.0, 4_000_000.0, 0.0][..],
        )
        .unwrap();
        dir.write_tag(
            Tag::GeoKeyDirectoryTag,
            &[1_u16, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32652][..],
        )
        .unwrap();
        image.write_data(&data).unwrap();

        if overview {
            let (w, h) = (WIDTH / 2, HEIGHT / 2);
            let reduced: Vec<u16> = (0..h)
                .flat_map(|_| (0..w).map(|x| u16::try_from(3_900 - x * 200).unwrap()))
                .collect();
            let mut image = encoder.new_image::<colortype::Gray16>(w, h).unwrap();
            image.encoder().write_tag(Tag::NewSubfileType, 1_u32).unwrap();
            image.write_data(&reduced).unwrap();
        }
    }
    cursor.into_inner()
}

/// Counts the bytes pulled through it.
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    read: Rc<Cell<u64>>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read.set(self.read.get() + n as u64);
        Ok(n)
    }
}

impl Seek for CountingReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[test]
fn geotiff_metadata_and_georeferencing() {
    let raster = GeoTiffOpener::new()
        .open_bytes("utm.tif", utm_geotiff(HEIGHT, false))
        .unwrap();
    let meta = raster.metadata();
    assert_eq!((meta.image_width(), meta.image_height()), (WIDTH, HEIGHT));
    assert_eq!(meta.band_count, 1);
    assert_eq!(meta.data_type, DataType::UInt16);
    assert_eq!(meta.file_type, "GTiff/GeoTIFF");
    assert_eq!(meta.projection.epsg, Some(32652));
    assert_eq!(meta.projection.unit, "metre");
    assert_eq!(meta.levels.len(), 1, "no stored overviews");

    let gt = raster.geo_transform().expect("tiepoint and scale present");
    assert_eq!(gt.pixel_to_projected(Point::new(10.0, 10.0)), Point::new(500_300.0, 3_999_700.0));
    let extent = meta.geo_extent.expect("extent derived from transform");
    assert_eq!(extent.width(), 1_200.0);
    assert_eq!(extent.height(), 900.0);

    let reprojector = raster.reprojector().expect("EPSG:32652 is known");
    let lon_lat = reprojector
        .to_geographic(Point::new(500_000.0, 4_000_000.0))
        .unwrap();
    assert!((lon_lat.x - 129.0).abs() < 1e-6, "central meridian, got {}", lon_lat.x);
}

#[test]
fn geotiff_decodes_overview_windows() {
    let mut raster = GeoTiffOpener::new()
        .with_pixel_format(PixelFormat::Rgba8)
        .open_bytes("utm.tif", utm_geotiff(7, false))
        .unwrap();
    let mut reports = Vec::new();
    raster.build_pyramids(&[2, 4], &mut |p| reports.push(p)).unwrap();
    assert_eq!(reports.first(), Some(&0));
    assert_eq!(reports.last(), Some(&100));
    let factors: Vec<u32> = raster.metadata().levels.iter().map(PyramidLevel::factor).collect();
    assert_eq!(factors, [1, 2, 4]);

    let request = RasterWindowRequest::new(
        RasterWindow::new(8, 4, 16, 16),
        PyramidLevel::new(4).unwrap(),
    );
    let buffer = raster.decode_window(&request).unwrap();
    assert_eq!((buffer.width(), buffer.height()), (4, 4));
    assert_eq!(buffer.bytes().len(), 4 * 4 * 4);
    // Level column 2 samples source column 8 (value 800 of 0..3900).
    let px = buffer.pixel(0, 0).unwrap();
    assert_eq!(px[3], 255, "opaque alpha");
    assert_eq!(px[0], 52);
}

#[test]
fn window_decode_reads_only_the_strips_it_touches() {
    let read = Rc::new(Cell::new(0));
    let reader = CountingReader {
        inner: Cursor::new(utm_geotiff(2, false)),
        read: Rc::clone(&read),
    };
    let raster = GeoTiffOpener::new().open_reader("strips.tif", reader).unwrap();
    read.set(0);

    let request = RasterWindowRequest::new(RasterWindow::new(0, 0, 4, 4), PyramidLevel::FULL);
    let buffer = raster.decode_window(&request).unwrap();
    let image_bytes = u64::from(WIDTH * HEIGHT * 2);
    // Two 2-row strips of 16-bit samples; the rest of the image stays on disk.
    assert!(read.get() < image_bytes / 4, "read {} bytes", read.get());

    // Without overviews the window stretches over its own range, 0..300.
    assert_eq!(buffer.pixel(0, 0), Some(&[0][..]));
    assert_eq!(buffer.pixel(1, 3), Some(&[85][..]));
    assert_eq!(buffer.pixel(3, 2), Some(&[255][..]));
}

#[test]
fn stored_overviews_become_pyramid_levels() {
    let mut raster = GeoTiffOpener::new()
        .open_bytes("ovr.tif", utm_geotiff(5, true))
        .unwrap();
    let factors: Vec<u32> = raster.metadata().levels.iter().map(PyramidLevel::factor).collect();
    assert_eq!(factors, [1, 2], "the half-size image is an overview");

    let half = PyramidLevel::new(2).unwrap();
    let request = RasterWindowRequest::new(RasterWindow::full(WIDTH, HEIGHT), half);
    let buffer = raster.decode_window(&request).unwrap();
    assert_eq!((buffer.width(), buffer.height()), (20, 15));
    // Decoded from the stored image (reversed gradient), not the full one.
    assert_eq!(buffer.pixel(0, 0), Some(&[255][..]));
    assert!(buffer.pixel(19, 0).unwrap()[0] < 10);

    raster.build_pyramids(&[2, 4], &mut |_| {}).unwrap();
    let factors: Vec<u32> = raster.metadata().levels.iter().map(PyramidLevel::factor).collect();
    assert_eq!(factors, [1, 2, 4]);
    let buffer = raster.decode_window(&request).unwrap();
    assert!(buffer.pixel(0, 0).unwrap()[0] > 250, "level 2 still comes from the file");
}

#[test]
fn garbage_bytes_are_an_open_error() {
    let err = GeoTiffOpener::new()
        .open_bytes("junk.tif", b"definitely not a tiff".to_vec())
        .unwrap_err();
    assert!(matches!(err, OpenError::Tiff { .. }), "got {err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = GeoTiffOpener::new()
        .open(Path::new("/nonexistent/geoscope/missing.tif"))
        .err().unwrap();
    assert!(matches!(err, OpenError::Io { .. }), "got {err}");
}

#[test]
fn open_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("geoscope-open-{}.tif", std::process::id()));
    std::fs::write(&path, utm_geotiff(4, true)).unwrap();
    let source = GeoTiffOpener::new().open(&path);
    let source = source.unwrap();
    assert_eq!(source.metadata().image_width(), WIDTH);
    let request = RasterWindowRequest::new(RasterWindow::new(30, 20, 10, 10), PyramidLevel::FULL);
    assert_eq!(source.decode_window(&request).unwrap().width(), 10);
    drop(source);
    std::fs::remove_file(&path).ok();
}
