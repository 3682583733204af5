use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crack_thresh::{Filter, FilterMode, filter_adaptive, filter_simple};

fn gradient_image(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .map(|i| (((i % width) + (i / width) * 3) % 256) as u8)
        .collect()
}

fn bench_simple_medium(c: &mut Criterion) {
    let gray = gradient_image(640, 480);
    c.bench_function("filter_simple_640x480", |b| {
        b.iter(|| filter_simple(black_box(&gray), 640, 480, 0, 0, black_box(60)))
    });
}

fn bench_adaptive_medium(c: &mut Criterion) {
    let gray = gradient_image(640, 480);
    c.bench_function("filter_adaptive_640x480", |b| {
        b.iter(|| {
            filter_adaptive(
                black_box(&gray),
                640,
                480,
                0,
                0,
                black_box(0.15),
                black_box(8),
            )
        })
    });
}

fn bench_adaptive_large(c: &mut Criterion) {
    let gray = gradient_image(1920, 1080);
    let mode = FilterMode::Adaptive {
        threshold: 0.15,
        radius: 15,
    };
    c.bench_function("filter_adaptive_1920x1080", |b| {
        b.iter(|| Filter::new(mode).apply(black_box(&gray), 1920, 1080))
    });
    c.bench_function("filter_adaptive_par_1920x1080", |b| {
        b.iter(|| Filter::new(mode).parallel(true).apply(black_box(&gray), 1920, 1080))
    });
}

criterion_group!(
    benches,
    bench_simple_medium,
    bench_adaptive_medium,
    bench_adaptive_large
);
criterion_main!(benches);
