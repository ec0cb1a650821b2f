// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use geoscope_source::{DecodeError, OpenError};
use geoscope_view2d::{FitError, TransformError};

use crate::controller::ViewportState;

/// Everything a [`ViewportController`](crate::ViewportController) operation
/// can fail with. All of it is recoverable.
///
/// Overview build failures and unprojectable readouts are not errors: the
/// controller falls back to full resolution and projected coordinates.
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    /// The raster could not be opened.
    #[error(transparent)]
    Open(#[from] OpenError),
    /// A window could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The raster cannot be fitted to the screen.
    #[error(transparent)]
    Fit(#[from] FitError),
    /// A coordinate conversion was undefined.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The operation needs an open raster.
    #[error("no raster is open")]
    NoRaster,
    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while {state:?}")]
    InvalidTransition {
        /// What was attempted.
        operation: &'static str,
        /// The state it was attempted in.
        state: ViewportState,
    },
}
