// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use geoscope_source::PixelBuffer;
use kurbo::{Affine, Point, Size};

/// Where the controller puts the decoded bitmap.
///
/// The surface holds one bitmap, placed at `position` with `size` in
/// content-local coordinates, and draws it through the view transform. A
/// host backs this with its widget toolkit; [`RecordingSurface`] keeps the
/// latest values for inspection.
pub trait RenderSurface {
    /// Replaces the bitmap.
    fn set_content(&mut self, content: &PixelBuffer);
    /// Moves the bitmap's top-left corner (content-local).
    fn set_position(&mut self, position: Point);
    /// Sets the bitmap's displayed size (content-local).
    fn set_size(&mut self, size: Size);
    /// Sets the content-to-screen transform.
    fn set_view_transform(&mut self, transform: Affine);
    /// Routes all pointer input to the viewport until released.
    fn capture_input(&mut self);
    /// Ends a capture started by [`Self::capture_input`].
    fn release_input(&mut self);
}

/// A [`RenderSurface`] that only remembers what it was told.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    /// Latest bitmap.
    pub content: Option<PixelBuffer>,
    /// Number of bitmaps received.
    pub content_updates: usize,
    /// Latest position.
    pub position: Point,
    /// Latest displayed size.
    pub size: Size,
    /// Latest view transform.
    pub view_transform: Affine,
    /// Whether input is captured.
    pub captured: bool,
}

impl RecordingSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_content(&mut self, content: &PixelBuffer) {
        self.content = Some(content.clone());
        self.content_updates += 1;
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn set_view_transform(&mut self, transform: Affine) {
        self.view_transform = transform;
    }

    fn capture_input(&mut self) {
        self.captured = true;
    }

    fn release_input(&mut self) {
        self.captured = false;
    }
}
