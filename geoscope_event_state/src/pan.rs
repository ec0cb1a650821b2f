// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan state: turn pointer positions into view translations.
//!
//! ## Usage
//!
//! 1) On pointer down call [`PanDrag::start`] with the pointer position and
//!    the view's current translation.
//! 2) On each move call [`PanDrag::translation_at`] to get the translation
//!    that keeps the grabbed content under the pointer.
//! 3) On pointer up call [`PanDrag::end`].
//!
//! Translations are always computed from the start of the drag, not
//! accumulated from deltas, so no error builds up over a long drag.

use kurbo::{Point, Vec2};

/// Tracks one drag-to-pan gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanDrag {
    active: Option<Grab>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    start: Point,
    origin: Vec2,
}

impl PanDrag {
    /// Starts a drag at `pointer` over a view translated by `origin`.
    ///
    /// A drag already in progress is replaced.
    pub fn start(&mut self, pointer: Point, origin: Vec2) {
        self.active = Some(Grab {
            start: pointer,
            origin,
        });
    }

    /// Translation for the pointer at `current`: `origin - (start - current)`.
    ///
    /// Returns `None` when no drag is active.
    #[must_use]
    pub fn translation_at(&self, current: Point) -> Option<Vec2> {
        self.active.map(|grab| grab.origin - (grab.start - current))
    }

    /// Pointer position where the drag started.
    #[must_use]
    pub fn start_point(&self) -> Option<Point> {
        self.active.map(|grab| grab.start)
    }

    /// View translation when the drag started.
    #[must_use]
    pub fn origin(&self) -> Option<Vec2> {
        self.active.map(|grab| grab.origin)
    }

    /// Ends the drag, returning its start point and origin if one was active.
    pub fn end(&mut self) -> Option<(Point, Vec2)> {
        self.active.take().map(|grab| (grab.start, grab.origin))
    }

    /// Returns `true` while a drag is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
