// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use geoscope_pyramid::RasterWindow;

/// A raster could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its contents could not be decoded.
    #[error("cannot decode {}: {source}", .path.display())]
    Tiff {
        /// File that failed.
        path: PathBuf,
        /// Underlying decoder failure.
        #[source]
        source: tiff::TiffError,
    },
    /// The raster has a layout this crate does not support.
    #[error("unsupported raster {name}: {reason}")]
    Unsupported {
        /// Path or identifier of the raster.
        name: String,
        /// What is unsupported.
        reason: String,
    },
    /// The raster has no pixels.
    #[error("raster {name} has zero width or height")]
    Empty {
        /// Path or identifier of the raster.
        name: String,
    },
}

/// Overviews could not be built.
///
/// Not fatal: viewers fall back to decoding full resolution only.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PyramidError {
    /// A downsampling factor below 2 was requested.
    #[error("invalid overview factor {0}; factors must be at least 2")]
    InvalidFactor(u32),
    /// The source cannot build overviews.
    #[error("overviews are not supported: {0}")]
    Unsupported(String),
    /// Building started but failed.
    #[error("overview build failed: {0}")]
    Failed(String),
}

/// A window could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The window is empty or reaches outside the raster.
    #[error(
        "window {}x{}+{}+{} is outside the {width}x{height} raster",
        .window.width, .window.height, .window.x, .window.y
    )]
    OutOfBounds {
        /// Requested window.
        window: RasterWindow,
        /// Raster width.
        width: u32,
        /// Raster height.
        height: u32,
    },
    /// The level factor is not one of the raster's declared levels.
    #[error("pyramid level 1/{0} is not available")]
    UndeclaredLevel(u32),
    /// A decoded buffer does not match its declared size.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Bytes required by width, height, and format.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// The backend failed to read pixels.
    #[error("decode failed: {0}")]
    Backend(String),
}
