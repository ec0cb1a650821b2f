// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geoscope Event State: pointer interaction state for the viewport.
//!
//! Interactions that span several input events need a little state between
//! them. This crate keeps that state small and separate from the controller
//! that acts on it:
//!
//! - [`pan`]: drag-to-pan bookkeeping (pointer start and view origin).
//!
//! The state managers take raw pointer positions and produce view values; they
//! do not route events or own any view.
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use geoscope_event_state::pan::PanDrag;
//!
//! let mut pan = PanDrag::default();
//! pan.start(Point::new(300.0, 200.0), Vec2::new(10.0, 5.0));
//! assert_eq!(pan.translation_at(Point::new(280.0, 190.0)), Some(Vec2::new(-10.0, -5.0)));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

pub mod pan;
