//! Similarity and stitching performance benchmarks
//!
//! Frame comparison runs once per capture on the loop's critical path, so it
//! is measured on a full-HD region. Stitching runs once per session and is
//! measured on a 30-frame session.

use criterion::{Criterion, criterion_group, criterion_main};
use scrollshot_core::{
    capture::Frame,
    model::StitchMode,
    similarity::{NoChangeDetector, similarity},
    stitch::stitch,
};
use std::hint::black_box;

fn session_frames(count: u8) -> Vec<Frame> {
    (0..count)
        .map(|seed| {
            Frame::new(image::RgbImage::from_fn(800, 600, |x, y| {
                image::Rgb([(x % 256) as u8, (y % 256) as u8, seed])
            }))
        })
        .collect()
}

fn bench_similarity_1080p(c: &mut Criterion) {
    let a = Frame::from_test_pattern(1920, 1080);
    let b = Frame::filled(1920, 1080, [40, 40, 40]);

    c.bench_function("similarity_1080p", |bench| {
        bench.iter(|| similarity(black_box(&a), black_box(&b)));
    });
}

fn bench_detector_identical(c: &mut Criterion) {
    let a = Frame::from_test_pattern(1920, 1080);
    let b = a.clone();
    let detector = NoChangeDetector::default();

    c.bench_function("detector_identical_1080p", |bench| {
        bench.iter(|| detector.compare(black_box(&a), black_box(&b)));
    });
}

fn bench_vertical_stitch(c: &mut Criterion) {
    let frames = session_frames(30);

    c.bench_function("stitch_vertical_30x800x600", |bench| {
        bench.iter(|| stitch(black_box(&frames), &StitchMode::Vertical).unwrap());
    });
}

fn bench_grid_stitch(c: &mut Criterion) {
    let frames = session_frames(30);
    let mode = StitchMode::grid();

    c.bench_function("stitch_grid_30x800x600", |bench| {
        bench.iter(|| stitch(black_box(&frames), &mode).unwrap());
    });
}

criterion_group!(
    benches,
    bench_similarity_1080p,
    bench_detector_identical,
    bench_vertical_stitch,
    bench_grid_stitch
);
criterion_main!(benches);
