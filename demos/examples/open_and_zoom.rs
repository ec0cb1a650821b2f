// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open a raster and walk through a scripted viewing session.
//!
//! Opens a GeoTIFF (or synthesizes one), fits it to a virtual screen, then
//! zooms at a cursor, pans, rotates, and resets, printing the decoded level,
//! raster window, and cursor readout after each step.
//!
//! Run:
//! - `cargo run -p geoscope_demos --example open_and_zoom`
//! - `cargo run -p geoscope_demos --example open_and_zoom -- image.tif --width 1280 --height 720`
//! - `RUST_LOG=debug cargo run -p geoscope_demos --example open_and_zoom` to log decisions

use std::error::Error;
use std::path::PathBuf;
use std::sync::mpsc;

use clap::Parser;
use geoscope_demos::{init_tracing, load_config, synthetic_raster};
use geoscope_source::GeoTiffOpener;
use geoscope_viewport::{
    RecordingSurface, StatusEvent, ViewerConfig, ViewportController, ViewportError,
};
use kurbo::{Point, Size, Vec2};

/// Scripted pan/zoom session over one raster.
#[derive(Parser, Debug)]
#[command(name = "open_and_zoom")]
struct Args {
    /// GeoTIFF to open; a synthetic raster is used when omitted
    path: Option<PathBuf>,

    /// Screen width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Screen height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// JSON viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wheel steps towards the cursor
    #[arg(long, default_value_t = 3)]
    zoom_steps: u32,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn report(step: &str, viewport: &ViewportController<RecordingSurface>, cursor: Point) {
    let Some(view) = viewport.view() else {
        return;
    };
    let window = view.window();
    println!(
        "{step:<12} zoom {:>6.3}  level 1/{:<2}  window {}x{}+{}+{}",
        viewport.zoom_level().unwrap_or(1.0),
        view.level().factor(),
        window.width,
        window.height,
        window.x,
        window.y,
    );
    match viewport.cursor_readout(cursor) {
        Ok(readout) => println!("{:<12} {readout}", ""),
        Err(err) => println!("{:<12} readout unavailable: {err}", ""),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };
    let (tx, rx) = mpsc::channel();
    let screen = Size::new(args.width, args.height);
    let mut viewport =
        ViewportController::new(RecordingSurface::new(), tx, config.clone(), screen);

    match &args.path {
        Some(path) => viewport.open_path(
            &GeoTiffOpener::new().with_pixel_format(config.pixel_format),
            path,
        )?,
        None => viewport.open_raster(Box::new(
            synthetic_raster("synthetic", 3_000, 2_000, 500_000.0, 4_000_000.0)?
                .with_pixel_format(config.pixel_format),
        ))?,
    }

    for event in rx.try_iter() {
        match event {
            StatusEvent::Progress(100) => println!("overviews built"),
            StatusEvent::ImageOpened { header } => println!("{header}\n"),
            StatusEvent::Warning(message) => println!("warning: {message}"),
            _ => {}
        }
    }

    let cursor = Point::new(args.width * 0.3, args.height * 0.4);
    report("opened", &viewport, cursor);

    for step in 1..=args.zoom_steps {
        if !viewport.wheel(120.0, cursor)? {
            println!("zoom limit reached");
            break;
        }
        report(&format!("wheel +{step}"), &viewport, cursor);
    }

    viewport.pointer_down(cursor)?;
    viewport.pointer_move(cursor + Vec2::new(-120.0, -80.0))?;
    viewport.pointer_up(cursor)?;
    viewport.refresh()?;
    report("pan+refresh", &viewport, cursor);

    viewport.set_rotation(15.0)?;
    viewport.zoom_in()?;
    report("rotate+zoom", &viewport, cursor);

    match viewport.zoom(-120.0, cursor) {
        Ok(applied) => println!("wheel out applied: {applied}"),
        Err(ViewportError::Decode(err)) => println!("decode failed, view kept: {err}"),
        Err(err) => return Err(err.into()),
    }

    viewport.reset_zoom()?;
    report("reset", &viewport, cursor);

    let surface = viewport.surface();
    println!(
        "\nsurface: {} bitmaps, last at {:?} size {:?}",
        surface.content_updates, surface.position, surface.size
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);
    if let Err(err) = run(&args) {
        eprintln!("open_and_zoom: {err}");
        std::process::exit(1);
    }
}
