// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for fitting, coordinate conversion, and level selection.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use geoscope_geo::{AffineGeoTransform, CanvasExtent, ImageMetadata};
use geoscope_pyramid::{LevelPolicy, PyramidLevels, RasterWindow};
use geoscope_view2d::ViewState;
use geoscope_view2d::fit::fit_to_screen;
use geoscope_view2d::transform::{screen_to_image, visible_image_rect};
use kurbo::{Point, Size};

const SCREEN: Size = Size::new(1920.0, 1080.0);

fn georeferenced(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata::new("bench", width, height)
        .with_geo_transform(AffineGeoTransform::north_up(300_000.0, 4_200_000.0, 0.5, -0.5))
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    let plain = ImageMetadata::new("bench", 40_000, 30_000);
    group.bench_function("no_extent", |b| {
        b.iter(|| fit_to_screen(black_box(&plain), None, SCREEN));
    });

    let geo = georeferenced(40_000, 30_000);
    group.bench_function("own_extent", |b| {
        b.iter(|| fit_to_screen(black_box(&geo), None, SCREEN));
    });

    // A wider canvas shared with a neighbouring layer.
    let neighbour = georeferenced(10_000, 10_000).geo_extent;
    let canvas = CanvasExtent::union_of(geo.geo_extent.iter().chain(neighbour.iter()));
    group.bench_function("shared_canvas", |b| {
        b.iter(|| fit_to_screen(black_box(&geo), canvas.as_ref(), SCREEN));
    });

    group.finish();
}

fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("levels/select");
    let policy = LevelPolicy::default();
    let levels = PyramidLevels::from_factors([2, 4, 8, 16, 32, 64]);

    for width in [512_u32, 4_096, 65_536] {
        let window = RasterWindow::new(0, 0, width, width * 3 / 4);
        group.bench_with_input(BenchmarkId::from_parameter(width), &window, |b, window| {
            b.iter(|| policy.select(black_box(&levels), *window, SCREEN));
        });
    }

    group.finish();
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let mut meta = georeferenced(40_000, 30_000);
    if let Ok(outcome) = fit_to_screen(&meta, None, SCREEN) {
        outcome.apply_to(&mut meta);
    }
    let mut view = ViewState::new();
    view.set_rotation(15.0, Point::new(960.0, 540.0));

    group.bench_function("screen_to_image", |b| {
        b.iter(|| screen_to_image(black_box(Point::new(640.0, 360.0)), &view, &meta));
    });
    group.bench_function("visible_image_rect", |b| {
        b.iter(|| visible_image_rect(black_box(&view), &meta, SCREEN));
    });

    group.finish();
}

criterion_group!(benches, bench_fit, bench_levels, bench_transforms);
criterion_main!(benches);
