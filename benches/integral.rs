use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crack_thresh::filter::integral::IntegralImage;

fn bench_integral_build(c: &mut Criterion) {
    let small = vec![128u8; 640 * 480];
    c.bench_function("integral_build_640x480", |b| {
        b.iter(|| IntegralImage::build(black_box(&small), 640, 480))
    });

    let large = vec![128u8; 1920 * 1080];
    c.bench_function("integral_build_1920x1080", |b| {
        b.iter(|| IntegralImage::build(black_box(&large), 1920, 1080))
    });
}

fn bench_window_sum(c: &mut Criterion) {
    let gray = vec![200u8; 640 * 480];
    let integral = IntegralImage::build(&gray, 640, 480).expect("valid image");
    c.bench_function("window_sum_31x31", |b| {
        b.iter(|| integral.window_sum(black_box(100), black_box(100), black_box(130), black_box(130)))
    });
}

criterion_group!(benches, bench_integral_build, bench_window_sum);
criterion_main!(benches);
