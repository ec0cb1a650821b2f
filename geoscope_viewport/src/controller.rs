// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use geoscope_event_state::pan::PanDrag;
use geoscope_geo::{CanvasExtent, ImageMetadata, ProjectionError};
use geoscope_pyramid::{PyramidLevels, RasterWindow, RasterWindowRequest};
use geoscope_source::{PixelBuffer, RasterOpener, RasterSource};
use geoscope_view2d::ViewState;
use geoscope_view2d::fit::{canvas_pixel_size, fit_to_screen};
use geoscope_view2d::transform::{
    image_rect_to_content, image_to_projected, image_to_world, screen_to_image, visible_image_rect,
};
use kurbo::{Point, Rect, Size, Vec2};

use crate::config::ViewerConfig;
use crate::error::ViewportError;
use crate::readout::{CursorReadout, MapCoordinate};
use crate::status::{StatusEvent, StatusSink};
use crate::surface::RenderSurface;

/// Interaction state of a [`ViewportController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewportState {
    /// Waiting for input.
    #[default]
    Idle,
    /// A drag is moving the view.
    Panning,
    /// A fit is being computed.
    Fitting,
}

/// One open raster and how it is currently shown.
struct Session {
    source: Box<dyn RasterSource>,
    meta: ImageMetadata,
    canvas: Option<CanvasExtent>,
    view: ViewState,
    /// Viewer size right after the last fit; zoom limits are relative to it.
    fitted_viewer: Size,
    /// Set once a degraded map readout has been logged.
    readout_degraded: Cell<bool>,
}

impl Session {
    fn zoom(&self) -> f64 {
        let fitted = self.fitted_viewer.width;
        if fitted > 0.0 {
            self.meta.viewer_size().width / fitted * self.view.scale().x
        } else {
            1.0
        }
    }

    fn note_degraded(&self, reason: &ProjectionError) {
        if !self.readout_degraded.replace(true) {
            tracing::warn!(
                raster = %self.meta.file_name,
                %reason,
                "map readout falls back to projected coordinates"
            );
        }
    }
}

/// A candidate display state. Nothing is committed until it is complete.
struct Frame {
    meta: ImageMetadata,
    view: ViewState,
    /// `None` keeps the bitmap already on the surface.
    buffer: Option<PixelBuffer>,
    /// Content-local rectangle of the bitmap.
    placement: Rect,
}

/// Drives one raster viewport: open, fit, pan, zoom, rotate, and readouts.
///
/// The controller owns the open raster, its [`ImageMetadata`], the canvas
/// extent, and the [`ViewState`]. It pushes bitmaps and transforms to a
/// [`RenderSurface`] and publishes progress and readouts to a
/// [`StatusSink`].
///
/// Every operation computes its result aside and commits only on success: a
/// failed open, fit, or decode leaves the previous raster, view, and bitmap
/// exactly as they were.
pub struct ViewportController<S: RenderSurface> {
    surface: S,
    status: Box<dyn StatusSink>,
    config: ViewerConfig,
    screen: Size,
    state: ViewportState,
    pan: PanDrag,
    session: Option<Session>,
}

impl<S: RenderSurface + fmt::Debug> fmt::Debug for ViewportController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportController")
            .field("surface", &self.surface)
            .field("config", &self.config)
            .field("screen", &self.screen)
            .field("state", &self.state)
            .field("raster", &self.session.as_ref().map(|s| &s.meta.file_name))
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> ViewportController<S> {
    /// Creates a controller for a `screen`-sized viewport with nothing open.
    pub fn new(
        surface: S,
        status: impl StatusSink + 'static,
        config: ViewerConfig,
        screen: Size,
    ) -> Self {
        Self {
            surface,
            status: Box::new(status),
            config,
            screen,
            state: ViewportState::Idle,
            pan: PanDrag::default(),
            session: None,
        }
    }

    /// The render surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The render surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current interaction state.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Current screen size.
    #[must_use]
    pub fn screen_size(&self) -> Size {
        self.screen
    }

    /// Returns `true` once a raster is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Metadata of the open raster, including its current viewer size.
    #[must_use]
    pub fn metadata(&self) -> Option<&ImageMetadata> {
        self.session.as_ref().map(|s| &s.meta)
    }

    /// View state of the open raster.
    #[must_use]
    pub fn view(&self) -> Option<&ViewState> {
        self.session.as_ref().map(|s| &s.view)
    }

    /// Zoom relative to the fitted size (`1.0` right after a fit).
    #[must_use]
    pub fn zoom_level(&self) -> Option<f64> {
        self.session.as_ref().map(Session::zoom)
    }

    /// Opens `path` with `opener` and shows it.
    ///
    /// # Errors
    ///
    /// [`ViewportError::Open`] if the opener fails, otherwise as
    /// [`Self::open_raster`]. Either way a previously open raster stays as it
    /// was.
    pub fn open_path(
        &mut self,
        opener: &dyn RasterOpener,
        path: &Path,
    ) -> Result<(), ViewportError> {
        let source = opener.open(path).inspect_err(|err| {
            tracing::warn!(path = %path.display(), %err, "could not open raster");
        })?;
        self.open_raster(source)
    }

    /// Shows `source`, replacing any open raster.
    ///
    /// Overviews are built first, with progress published as
    /// [`StatusEvent::Progress`]. If that fails the raster is shown from full
    /// resolution only. The raster is then fitted to the screen, decoded at
    /// the coarsest practical level, centered, and announced with
    /// [`StatusEvent::ImageOpened`].
    ///
    /// # Errors
    ///
    /// [`ViewportError::Fit`] for rasters that cannot be fitted, or
    /// [`ViewportError::Decode`] if the first window fails to decode.
    pub fn open_raster(&mut self, mut source: Box<dyn RasterSource>) -> Result<(), ViewportError> {
        let started = Instant::now();
        let previous = self.state;
        self.state = ViewportState::Fitting;

        let status = &mut self.status;
        let built = source.build_pyramids(&self.config.overview_factors, &mut |percent| {
            status.publish(StatusEvent::Progress(percent));
        });
        let mut meta = source.metadata();
        if let Err(err) = built {
            tracing::warn!(
                raster = %meta.file_name,
                %err,
                "overview build failed; decoding from full resolution only"
            );
            self.status.publish(StatusEvent::Warning(format!(
                "{}: overviews unavailable ({err})",
                meta.file_name
            )));
            meta.levels = PyramidLevels::full_resolution_only();
        }

        let session = Session {
            canvas: meta.geo_extent.as_ref().map(CanvasExtent::from_extent),
            source,
            meta,
            view: ViewState::new(),
            fitted_viewer: Size::ZERO,
            readout_degraded: Cell::new(false),
        };
        let (frame, fitted) = match self.fit_frame(&session, session.view.clone()) {
            Ok(fitted) => fitted,
            Err(err) => {
                self.state = previous;
                return Err(err);
            }
        };

        self.end_pan();
        self.session = Some(session);
        self.commit(frame, fitted);
        self.state = ViewportState::Idle;

        if let Some(session) = &self.session {
            let meta = &session.meta;
            tracing::info!(
                raster = %meta.file_name,
                width = meta.image_width(),
                height = meta.image_height(),
                levels = meta.levels.len(),
                elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
                "raster opened"
            );
            self.status.publish(StatusEvent::ImageOpened {
                header: meta.to_string(),
            });
        }
        Ok(())
    }

    /// Begins a drag at `p`.
    ///
    /// # Errors
    ///
    /// [`ViewportError::NoRaster`] with nothing open, and
    /// [`ViewportError::InvalidTransition`] unless the controller is idle.
    pub fn pan_start(&mut self, p: Point) -> Result<(), ViewportError> {
        let origin = self.session()?.view.translation();
        self.require(ViewportState::Idle, "start a pan")?;
        self.pan.start(p, origin);
        self.state = ViewportState::Panning;
        self.surface.capture_input();
        Ok(())
    }

    /// Moves the drag to `p`. The view follows; nothing is reloaded.
    ///
    /// # Errors
    ///
    /// [`ViewportError::InvalidTransition`] unless panning.
    pub fn pan_move(&mut self, p: Point) -> Result<(), ViewportError> {
        self.require(ViewportState::Panning, "move a pan")?;
        let translation = self
            .pan
            .translation_at(p)
            .ok_or(ViewportError::InvalidTransition {
                operation: "move a pan",
                state: self.state,
            })?;
        let session = self.session.as_mut().ok_or(ViewportError::NoRaster)?;
        session.view.set_translation(translation);
        self.surface.set_view_transform(session.view.content_to_screen());
        Ok(())
    }

    /// Ends the drag and releases input.
    ///
    /// # Errors
    ///
    /// [`ViewportError::InvalidTransition`] unless panning.
    pub fn pan_end(&mut self) -> Result<(), ViewportError> {
        self.require(ViewportState::Panning, "end a pan")?;
        self.end_pan();
        Ok(())
    }

    /// Wheel zoom anchored at `cursor`.
    ///
    /// A positive `delta` zooms in by [`ViewerConfig::zoom_in_rate`], anything
    /// else out by [`ViewerConfig::zoom_out_rate`]. The raster's viewer size
    /// and margins grow by the rate, the view moves so the pixel under
    /// `cursor` stays there, and the newly visible window is decoded at the
    /// level the policy picks.
    ///
    /// Returns `Ok(false)` without changing anything when the zoom would leave
    /// the configured limits or `delta` is zero.
    ///
    /// # Errors
    ///
    /// [`ViewportError::Decode`] if the window fails to decode; the previous
    /// view and bitmap stay.
    pub fn zoom(&mut self, delta: f64, cursor: Point) -> Result<bool, ViewportError> {
        self.session()?;
        self.require(ViewportState::Idle, "zoom")?;
        if delta == 0.0 || !delta.is_finite() {
            return Ok(false);
        }
        let rate = self.config.wheel_rate(delta);
        let session = self.session()?;
        let zoom = session.zoom() * rate;
        if !self.config.allows_zoom(zoom) {
            tracing::debug!(zoom, "zoom refused at limit");
            return Ok(false);
        }

        let mut meta = session.meta.clone();
        if !meta.set_viewer_size(meta.viewer_size() * rate) {
            return Ok(false);
        }
        if let Some(extent) = meta.geo_extent.as_mut() {
            extent.set_margin(extent.margin() * rate);
        }
        let mut view = session.view.clone();
        view.anchor_content_rescale(cursor, rate);

        let frame = self.reload_frame(session, meta, view)?;
        let fitted = session.fitted_viewer;
        self.commit(frame, fitted);
        tracing::debug!(zoom, rate, "zoomed");
        Ok(true)
    }

    /// Toolbar zoom in about the screen center. No reload.
    ///
    /// # Errors
    ///
    /// As [`Self::zoom`], minus decoding.
    pub fn zoom_in(&mut self) -> Result<bool, ViewportError> {
        self.scale_view(self.config.toolbar_zoom_factor)
    }

    /// Toolbar zoom out about the screen center. No reload.
    ///
    /// # Errors
    ///
    /// As [`Self::zoom`], minus decoding.
    pub fn zoom_out(&mut self) -> Result<bool, ViewportError> {
        self.scale_view(1.0 / self.config.toolbar_zoom_factor)
    }

    /// Rotates the view to `degrees` about the screen center. No reload.
    ///
    /// # Errors
    ///
    /// [`ViewportError::NoRaster`] with nothing open, and
    /// [`ViewportError::InvalidTransition`] while panning.
    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), ViewportError> {
        self.session()?;
        self.require(ViewportState::Idle, "rotate")?;
        let center = self.screen_center();
        let session = self.session.as_mut().ok_or(ViewportError::NoRaster)?;
        session.view.rotate_about_screen_point(degrees, center);
        self.surface.set_view_transform(session.view.content_to_screen());
        Ok(())
    }

    /// Changes the screen size and refits an open raster to it.
    ///
    /// # Errors
    ///
    /// As [`Self::fit_to_frame`].
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ViewportError> {
        self.screen = Size::new(width, height);
        if self.session.is_none() {
            return Ok(());
        }
        self.fit_to_frame()
    }

    /// Fits the raster to the screen, decodes the whole of it at the coarsest
    /// practical level, and centers it. Ends any drag.
    ///
    /// Toolbar zoom is dropped so the fitted raster is never larger than the
    /// screen; rotation is kept. [`Self::reset_zoom`] also clears rotation.
    ///
    /// # Errors
    ///
    /// [`ViewportError::Fit`] for an empty screen, or
    /// [`ViewportError::Decode`]; nothing changes on failure.
    pub fn fit_to_frame(&mut self) -> Result<(), ViewportError> {
        let mut view = self.session()?.view.clone();
        view.set_scale(Vec2::new(1.0, 1.0));
        self.refit(view)
    }

    /// Centers the canvas in the screen.
    ///
    /// # Errors
    ///
    /// [`ViewportError::NoRaster`] with nothing open.
    pub fn set_center(&mut self) -> Result<(), ViewportError> {
        let center = self.screen_center();
        let session = self.session.as_mut().ok_or(ViewportError::NoRaster)?;
        let canvas = canvas_pixel_size(&session.meta, session.canvas.as_ref());
        session
            .view
            .place_content_point((canvas.to_vec2() / 2.0).to_point(), center);
        self.surface.set_view_transform(session.view.content_to_screen());
        Ok(())
    }

    /// Returns to the just-opened presentation: unit scale, no rotation,
    /// fitted and centered.
    ///
    /// # Errors
    ///
    /// As [`Self::fit_to_frame`].
    pub fn reset_zoom(&mut self) -> Result<(), ViewportError> {
        self.session()?;
        self.refit(ViewState::new())
    }

    /// Decodes whatever the current view shows, e.g. after a pan.
    ///
    /// Returns `Ok(false)` when the view is entirely off the raster and the
    /// bitmap was kept.
    ///
    /// # Errors
    ///
    /// [`ViewportError::Decode`]; the previous bitmap stays.
    pub fn refresh(&mut self) -> Result<bool, ViewportError> {
        self.require(ViewportState::Idle, "refresh")?;
        let session = self.session()?;
        let frame = self.reload_frame(session, session.meta.clone(), session.view.clone())?;
        let decoded = frame.buffer.is_some();
        let fitted = session.fitted_viewer;
        self.commit(frame, fitted);
        Ok(decoded)
    }

    /// Pointer pressed: starts a drag. Ignored with nothing open.
    ///
    /// # Errors
    ///
    /// As [`Self::pan_start`].
    pub fn pointer_down(&mut self, p: Point) -> Result<(), ViewportError> {
        if self.session.is_none() {
            return Ok(());
        }
        self.pan_start(p)
    }

    /// Pointer moved: follows a drag, then publishes a cursor readout.
    ///
    /// # Errors
    ///
    /// As [`Self::pan_move`] and [`Self::cursor_readout`].
    pub fn pointer_move(&mut self, p: Point) -> Result<Option<CursorReadout>, ViewportError> {
        if self.session.is_none() {
            return Ok(None);
        }
        if self.state == ViewportState::Panning {
            self.pan_move(p)?;
        }
        let readout = self.cursor_readout(p)?;
        self.status.publish(StatusEvent::Cursor(readout));
        Ok(Some(readout))
    }

    /// Pointer released: ends a drag if there is one.
    ///
    /// # Errors
    ///
    /// Never in practice; kept for symmetry with the other adapters.
    pub fn pointer_up(&mut self, _p: Point) -> Result<(), ViewportError> {
        if self.state == ViewportState::Panning {
            self.pan_end()?;
        }
        Ok(())
    }

    /// Mouse wheel at `p`. Ignored with nothing open.
    ///
    /// # Errors
    ///
    /// As [`Self::zoom`].
    pub fn wheel(&mut self, delta: f64, p: Point) -> Result<bool, ViewportError> {
        if self.session.is_none() {
            return Ok(false);
        }
        self.zoom(delta, p)
    }

    /// What the screen point `p` shows.
    ///
    /// The map coordinate is geographic when the raster can be reprojected,
    /// projected when it cannot, and absent without a geotransform.
    ///
    /// # Errors
    ///
    /// [`ViewportError::NoRaster`] with nothing open, or
    /// [`ViewportError::Transform`] before a successful fit.
    pub fn cursor_readout(&self, p: Point) -> Result<CursorReadout, ViewportError> {
        let session = self.session()?;
        let image = screen_to_image(p, &session.view, &session.meta)?;
        let map = session
            .source
            .geo_transform()
            .or(session.meta.geo_transform)
            .map(|gt| {
                let projected = image_to_projected(image, &gt);
                let Some(reprojector) = session.source.reprojector() else {
                    session.note_degraded(&ProjectionError::MissingSpatialReference);
                    return MapCoordinate::Projected(projected);
                };
                match image_to_world(image, &gt, &reprojector) {
                    Ok(lon_lat) => MapCoordinate::Geographic(lon_lat),
                    Err(err) => {
                        session.note_degraded(&err);
                        MapCoordinate::Projected(projected)
                    }
                }
            });
        Ok(CursorReadout {
            display: p,
            image,
            map,
        })
    }

    fn session(&self) -> Result<&Session, ViewportError> {
        self.session.as_ref().ok_or(ViewportError::NoRaster)
    }

    fn require(&self, state: ViewportState, operation: &'static str) -> Result<(), ViewportError> {
        if self.state == state {
            Ok(())
        } else {
            Err(ViewportError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn screen_center(&self) -> Point {
        (self.screen.to_vec2() / 2.0).to_point()
    }

    fn end_pan(&mut self) {
        if self.pan.end().is_some() {
            self.surface.release_input();
        }
        self.state = ViewportState::Idle;
    }

    fn scale_view(&mut self, factor: f64) -> Result<bool, ViewportError> {
        self.session()?;
        self.require(ViewportState::Idle, "zoom")?;
        if !(factor.is_finite() && factor > 0.0) {
            return Ok(false);
        }
        let center = self.screen_center();
        let session = self.session.as_mut().ok_or(ViewportError::NoRaster)?;
        if !self.config.allows_zoom(session.zoom() * factor) {
            tracing::debug!(factor, "toolbar zoom refused at limit");
            return Ok(false);
        }
        session.view.zoom_about_screen_point(center, factor);
        self.surface.set_view_transform(session.view.content_to_screen());
        Ok(true)
    }

    fn refit(&mut self, view: ViewState) -> Result<(), ViewportError> {
        let previous = self.state;
        self.state = ViewportState::Fitting;
        let fitted = self
            .session()
            .and_then(|session| self.fit_frame(session, view));
        match fitted {
            Ok((frame, fitted)) => {
                self.end_pan();
                self.commit(frame, fitted);
                Ok(())
            }
            Err(err) => {
                self.state = previous;
                Err(err)
            }
        }
    }

    /// Fits `session` to the screen starting from `view`, decodes the full
    /// window, and centers the canvas.
    fn fit_frame(
        &self,
        session: &Session,
        mut view: ViewState,
    ) -> Result<(Frame, Size), ViewportError> {
        let outcome = fit_to_screen(&session.meta, session.canvas.as_ref(), self.screen)?;
        let mut meta = session.meta.clone();
        outcome.apply_to(&mut meta);

        let policy = &self.config.level_policy;
        let request = policy.request(&meta.levels, meta.full_window(), outcome.viewer_size);
        tracing::debug!(
            viewer_width = outcome.viewer_size.width,
            viewer_height = outcome.viewer_size.height,
            level = request.level.factor(),
            "fitted raster to screen"
        );
        let buffer = session.source.decode_window(&request)?;
        view.set_loaded(request.level, request.window);
        view.place_content_point(
            (outcome.canvas_size.to_vec2() / 2.0).to_point(),
            self.screen_center(),
        );

        let placement = placement(&meta, &view)?;
        Ok((
            Frame {
                meta,
                view,
                buffer: Some(buffer),
                placement,
            },
            outcome.viewer_size,
        ))
    }

    /// Decodes the window `view` shows of `meta`.
    fn reload_frame(
        &self,
        session: &Session,
        meta: ImageMetadata,
        mut view: ViewState,
    ) -> Result<Frame, ViewportError> {
        let visible = visible_image_rect(&view, &meta, self.screen)?;
        let buffer = match RasterWindow::from_image_rect(
            visible,
            meta.image_width(),
            meta.image_height(),
        ) {
            Some(window) => {
                let request = self.config.level_policy.request(
                    &meta.levels,
                    window,
                    on_screen_size(window, &meta, &view),
                );
                tracing::debug!(
                    x = window.x,
                    y = window.y,
                    width = window.width,
                    height = window.height,
                    level = request.level.factor(),
                    "decoding visible window"
                );
                let buffer = session.source.decode_window(&request)?;
                view.set_loaded(request.level, request.window);
                Some(buffer)
            }
            None => {
                tracing::debug!("view is off the raster; keeping the current bitmap");
                None
            }
        };
        let placement = placement(&meta, &view)?;
        Ok(Frame {
            meta,
            view,
            buffer,
            placement,
        })
    }

    fn commit(&mut self, frame: Frame, fitted_viewer: Size) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(buffer) = &frame.buffer {
            self.surface.set_content(buffer);
        }
        self.surface.set_size(frame.placement.size());
        self.surface.set_position(frame.placement.origin());
        self.surface.set_view_transform(frame.view.content_to_screen());
        session.meta = frame.meta;
        session.view = frame.view;
        session.fitted_viewer = fitted_viewer;
    }
}

/// Content-local rectangle of the bitmap `view` says is loaded.
fn placement(meta: &ImageMetadata, view: &ViewState) -> Result<Rect, ViewportError> {
    let covered = RasterWindowRequest::new(view.window(), view.level())
        .covered_window(meta.image_width(), meta.image_height());
    Ok(image_rect_to_content(covered.to_rect(), meta)?)
}

/// How large `window` appears on screen under `view`.
fn on_screen_size(window: RasterWindow, meta: &ImageMetadata, view: &ViewState) -> Size {
    let image = meta.image_size();
    let viewer = meta.viewer_size();
    let scale: Vec2 = view.scale();
    Size::new(
        f64::from(window.width) * viewer.width / image.width * scale.x,
        f64::from(window.height) * viewer.height / image.height * scale.y,
    )
}
