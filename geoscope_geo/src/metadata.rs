// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::fmt;

use geoscope_pyramid::{PyramidLevels, RasterWindow};
use kurbo::Size;

use crate::extent::GeoExtent;
use crate::geotransform::AffineGeoTransform;

/// Sample type of a raster band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Unsigned 8-bit.
    #[default]
    Byte,
    /// Unsigned 16-bit.
    UInt16,
    /// Signed 16-bit.
    Int16,
    /// Unsigned 32-bit.
    UInt32,
    /// Signed 32-bit.
    Int32,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Anything else.
    Unknown,
}

impl DataType {
    /// The conventional GDAL name of the type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::UInt16 => "UInt16",
            Self::Int16 => "Int16",
            Self::UInt32 => "UInt32",
            Self::Int32 => "Int32",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel layout of decoded pixel buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// One 8-bit gray channel.
    #[default]
    Gray8,
    /// Three 8-bit channels, red first.
    Rgb8,
    /// Four 8-bit channels, red first, straight alpha.
    Rgba8,
}

impl PixelFormat {
    /// Bytes used by one pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Name and linear unit of the raster's coordinate reference system.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ProjectionInfo {
    /// Human-readable CRS name, e.g. `"WGS 84 / UTM zone 52N"`.
    pub name: String,
    /// Unit of projected coordinates, e.g. `"metre"` or `"degree"`.
    pub unit: String,
    /// EPSG code, when known.
    pub epsg: Option<u16>,
}

/// Everything the viewport needs to know about one opened raster.
///
/// Descriptive fields are public. The native pixel size is fixed at
/// construction; the viewer size (the raster's current on-screen size in
/// content pixels) is only changed through [`ImageMetadata::set_viewer_size`],
/// which keeps it positive.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageMetadata {
    /// Path or other identifier of the file.
    pub file_name: String,
    /// Format driver, e.g. `"GTiff/GeoTIFF"`.
    pub file_type: String,
    /// Free-form description.
    pub description: String,
    /// Number of bands.
    pub band_count: u32,
    /// Sample type of the first band.
    pub data_type: DataType,
    /// CRS description.
    pub projection: ProjectionInfo,
    /// World extent, when the raster is georeferenced.
    pub geo_extent: Option<GeoExtent>,
    /// Pixel to projected mapping, when the raster is georeferenced.
    pub geo_transform: Option<AffineGeoTransform>,
    /// Pyramid levels available for decoding.
    pub levels: PyramidLevels,
    /// Layout of decoded buffers.
    pub pixel_format: PixelFormat,
    image_width: u32,
    image_height: u32,
    viewer_size: Size,
}

impl ImageMetadata {
    /// Creates metadata for a `width` x `height` raster.
    ///
    /// The viewer size starts at the native pixel size.
    #[must_use]
    pub fn new(file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: String::new(),
            description: String::new(),
            band_count: 1,
            data_type: DataType::default(),
            projection: ProjectionInfo::default(),
            geo_extent: None,
            geo_transform: None,
            levels: PyramidLevels::full_resolution_only(),
            pixel_format: PixelFormat::default(),
            image_width: width,
            image_height: height,
            viewer_size: Size::new(f64::from(width), f64::from(height)),
        }
    }

    /// Attaches a geotransform and derives the world extent from it.
    #[must_use]
    pub fn with_geo_transform(mut self, transform: AffineGeoTransform) -> Self {
        self.geo_extent = Some(transform.extent_for(self.image_width, self.image_height));
        self.geo_transform = Some(transform);
        self
    }

    /// Sets the world extent without a geotransform.
    #[must_use]
    pub fn with_geo_extent(mut self, extent: GeoExtent) -> Self {
        self.geo_extent = Some(extent);
        self
    }

    /// Sets the pyramid levels.
    #[must_use]
    pub fn with_levels(mut self, levels: PyramidLevels) -> Self {
        self.levels = levels;
        self
    }

    /// Native width in pixels.
    #[must_use]
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Native height in pixels.
    #[must_use]
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Native size in pixels.
    #[must_use]
    pub fn image_size(&self) -> Size {
        Size::new(f64::from(self.image_width), f64::from(self.image_height))
    }

    /// The window covering the whole raster.
    #[must_use]
    pub fn full_window(&self) -> RasterWindow {
        RasterWindow::full(self.image_width, self.image_height)
    }

    /// Returns `true` if the raster has pixels on both axes.
    #[must_use]
    pub fn has_valid_size(&self) -> bool {
        self.image_width > 0 && self.image_height > 0
    }

    /// Current on-screen size of the raster in content pixels.
    #[must_use]
    pub fn viewer_size(&self) -> Size {
        self.viewer_size
    }

    /// Sets the on-screen size.
    ///
    /// Sizes that are not finite and positive on both axes are ignored and
    /// `false` is returned.
    pub fn set_viewer_size(&mut self, size: Size) -> bool {
        if !(size.is_finite() && size.width > 0.0 && size.height > 0.0) {
            return false;
        }
        self.viewer_size = size;
        true
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Size (X,Y) : ({}, {})",
            self.image_width, self.image_height
        )?;
        writeln!(f, "Band : {}", self.band_count)?;
        writeln!(f, "File Type : {}", self.file_type)?;
        writeln!(f, "Data Type : {}", self.data_type)?;
        writeln!(f, "Proj : {}", self.projection.name)?;
        write!(f, "Unit : {}", self.projection.unit)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use kurbo::Size;

    use super::{DataType, ImageMetadata, PixelFormat};
    use crate::AffineGeoTransform;

    #[test]
    fn viewer_size_starts_at_native_size() {
        let meta = ImageMetadata::new("scene.tif", 10_000, 8_000);
        assert_eq!(meta.viewer_size(), Size::new(10_000.0, 8_000.0));
        assert!(meta.has_valid_size());
        assert!(meta.geo_extent.is_none());
    }

    #[test]
    fn set_viewer_size_rejects_non_positive() {
        let mut meta = ImageMetadata::new("scene.tif", 100, 50);
        assert!(!meta.set_viewer_size(Size::new(0.0, 10.0)));
        assert!(!meta.set_viewer_size(Size::new(f64::NAN, 10.0)));
        assert_eq!(meta.viewer_size(), Size::new(100.0, 50.0));
        assert!(meta.set_viewer_size(Size::new(20.0, 10.0)));
        assert_eq!(meta.viewer_size(), Size::new(20.0, 10.0));
    }

    #[test]
    fn zero_sized_raster_is_invalid() {
        assert!(!ImageMetadata::new("empty.tif", 0, 10).has_valid_size());
    }

    #[test]
    fn geo_transform_derives_extent() {
        let meta = ImageMetadata::new("utm.tif", 100, 50)
            .with_geo_transform(AffineGeoTransform::north_up(1_000.0, 2_000.0, 10.0, -10.0));
        let extent = meta.geo_extent.expect("derived from transform");
        assert_eq!(extent.width(), 1_000.0);
        assert_eq!(extent.height(), 500.0);
        assert_eq!(extent.max_y(), 2_000.0);
    }

    #[test]
    fn display_lists_header_fields() {
        let mut meta = ImageMetadata::new("scene.tif", 640, 480);
        meta.file_type = "GTiff/GeoTIFF".into();
        meta.data_type = DataType::UInt16;
        meta.band_count = 3;
        let text = meta.to_string();
        assert!(text.starts_with("Size (X,Y) : (640, 480)"));
        assert!(text.contains("Band : 3"));
        assert!(text.contains("Data Type : UInt16"));
        assert!(text.contains("File Type : GTiff/GeoTIFF"));
    }

    #[test]
    fn bytes_per_pixel() {
        assert_eq!(PixelFormat::Gray8.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
    }
}
