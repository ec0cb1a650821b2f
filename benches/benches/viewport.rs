// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `geoscope_viewport` interaction against an in-memory raster.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use geoscope_source::MemoryRaster;
use geoscope_viewport::{NoStatus, RecordingSurface, ViewerConfig, ViewportController};
use kurbo::{Point, Size};

const SCREEN: Size = Size::new(800.0, 600.0);

fn raster() -> MemoryRaster {
    MemoryRaster::from_fn("bench", 2_048, 1_536, 1, |x, y, _| (x * 7 + y * 13) as f32)
        .expect("non-empty raster")
}

fn opened() -> ViewportController<RecordingSurface> {
    let mut viewport =
        ViewportController::new(RecordingSurface::new(), NoStatus, ViewerConfig::default(), SCREEN);
    viewport
        .open_raster(Box::new(raster()))
        .expect("raster opens");
    viewport
}

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport");

    group.bench_function("open_raster", |b| {
        b.iter_batched(
            raster,
            |raster| {
                let mut viewport = ViewportController::new(
                    RecordingSurface::new(),
                    NoStatus,
                    ViewerConfig::default(),
                    SCREEN,
                );
                black_box(viewport.open_raster(Box::new(raster)))
            },
            BatchSize::LargeInput,
        );
    });

    let mut viewport = opened();
    let cursor = Point::new(310.0, 220.0);
    group.bench_function("wheel_in_out", |b| {
        b.iter(|| {
            black_box(viewport.wheel(1.0, cursor)).ok();
            black_box(viewport.wheel(-1.0, cursor)).ok();
        });
    });

    group.bench_function("pan_move", |b| {
        let mut x = 0.0;
        viewport.pan_start(Point::ORIGIN).ok();
        b.iter(|| {
            x += 1.0;
            black_box(viewport.pan_move(Point::new(x % 100.0, 0.0))).ok();
        });
        viewport.pan_end().ok();
    });

    group.bench_function("cursor_readout", |b| {
        b.iter(|| black_box(viewport.cursor_readout(black_box(cursor))));
    });

    group.finish();
}

criterion_group!(benches, bench_viewport);
criterion_main!(benches);
