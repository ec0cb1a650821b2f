// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register two overlapping rasters on one canvas.
//!
//! Fits both layers against the union of their extents and shows that a
//! world coordinate inside the overlap lands on the same content pixel in
//! either layer.
//!
//! Run:
//! - `cargo run -p geoscope_demos --example shared_canvas`

use std::error::Error;

use geoscope_demos::{init_tracing, synthetic_raster};
use geoscope_geo::{CanvasExtent, ImageMetadata};
use geoscope_source::RasterSource;
use geoscope_view2d::fit::{canvas_pixel_size, fit_to_screen};
use geoscope_view2d::transform::image_to_content;
use kurbo::{Point, Size};

fn content_of_world(meta: &ImageMetadata, world: Point) -> Option<Point> {
    let pixel = meta.geo_transform?.projected_to_pixel(world)?;
    image_to_content(pixel, meta).ok()
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("info");
    let screen = Size::new(1024.0, 768.0);

    // 60 km x 45 km, and a smaller tile overlapping its south-east corner.
    let west = synthetic_raster("west", 2_000, 1_500, 500_000.0, 4_050_000.0)?.metadata();
    let east = synthetic_raster("east", 1_000, 1_000, 540_000.0, 4_020_000.0)?.metadata();

    let canvas = CanvasExtent::union_of(west.geo_extent.iter().chain(east.geo_extent.iter()))
        .ok_or("layers are not georeferenced")?;
    println!("canvas: {:?}", canvas.bounds());

    let mut layers = [west, east];
    for meta in &mut layers {
        let outcome = fit_to_screen(meta, Some(&canvas), screen)?;
        outcome.apply_to(meta);
        println!(
            "{:<5} viewer {:>7.1} x {:>7.1}  margin ({:>6.1}, {:>6.1})",
            meta.file_name,
            outcome.viewer_size.width,
            outcome.viewer_size.height,
            outcome.margin.x,
            outcome.margin.y,
        );
    }
    println!(
        "canvas in content pixels: {:?}",
        canvas_pixel_size(&layers[0], Some(&canvas))
    );

    let shared = Point::new(550_000.0, 4_010_000.0);
    for meta in &layers {
        match content_of_world(meta, shared) {
            Some(p) => println!(
                "{:<5} shows {shared:?} at content ({:.3}, {:.3})",
                meta.file_name, p.x, p.y
            ),
            None => println!("{:<5} cannot place {shared:?}", meta.file_name),
        }
    }
    Ok(())
}
