use pprof::criterion::{Output, PProfProfiler};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elm_path::PathfindingEngine;
use glam::Vec2;

/// A procedurally generated obstacle course: a grid of pillars spaced widely
/// enough to leave room for a ship to maneuver between them.
fn synthetic_grid() -> elm_path::TileGrid {
    let mut data = Vec::new();
    for y in 0..1024u16 {
        for x in 0..1024u16 {
            let pillar = x % 32 < 4 && y % 32 < 4 && x > 0 && y > 0;
            data.push(if pillar { 1 } else { 0 });
        }
    }
    elm_path::TileGrid::from_tiles(data)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");
    group.sample_size(20);

    let grid = synthetic_grid();

    group.bench_function("engine_precompute", |b| {
        b.iter(|| {
            let engine = PathfindingEngine::new(black_box(&grid), black_box(0.875), black_box(true));
            black_box(engine);
        });
    });

    let mut engine = PathfindingEngine::new(&grid, 0.875, true);

    group.bench_function("find_path_corner_to_corner", |b| {
        b.iter(|| {
            let path = engine.find_path(
                black_box(Vec2::new(16.5, 16.5)),
                black_box(Vec2::new(1000.5, 1000.5)),
                black_box(0.875),
            );
            black_box(path);
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = criterion_benchmark
}
criterion_main!(benches);
