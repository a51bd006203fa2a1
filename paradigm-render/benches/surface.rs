use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use paradigm_core::{Drawable, ImageFrame, MarkerStyle, Rgba, ScaleView, Surface};
use paradigm_render::{NullSink, SkiaSurface};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn surface() -> SkiaSurface<NullSink> {
    SkiaSurface::new(WIDTH, HEIGHT, Rgba::gray(), None, NullSink).unwrap()
}

pub fn bench_rating_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("rating_frame");
    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));

    let ticks: Vec<i32> = (1..=9).collect();
    let movie = ImageFrame {
        width: 320,
        height: 180,
        rgba: vec![200; 320 * 180 * 4],
        pos: (0.0, 0.0),
        size: (1.0, 1.0),
    };

    group.bench_function("movie_and_scale", |b| {
        let mut s = surface();
        let mut marker = 1;
        b.iter(|| {
            let view = ScaleView {
                low: 1,
                high: 9,
                ticks: &ticks,
                marker,
                marker_style: MarkerStyle::Triangle,
                marker_color: Rgba::white(),
                description: "",
                pos: (0.0, -0.75),
                stretch: 2.7,
            };
            s.draw(&Drawable::Image(black_box(&movie))).unwrap();
            s.draw(&Drawable::RatingScale(&view)).unwrap();
            s.flip().unwrap();
            marker = marker % 9 + 1;
        });
    });

    group.bench_function("flip_blank", |b| {
        let mut s = surface();
        b.iter(|| s.flip().unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_rating_frame);
criterion_main!(benches);
