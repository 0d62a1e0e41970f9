use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use strokeforge::corpus::Corpus;
use strokeforge::layout::Layout;
use strokeforge::layouts::KnownLayout;
use strokeforge::remap::Remap;
use strokeforge::scorer::{Scorer, ScorerBuilder, SpeedModel, SpeedSample};

const TEXT: &str = "the quick brown fox jumps over the lazy dog, then sits; \
    a wizard's job is to vex chumps quickly in fog. pack my box with five dozen liquor jugs.";

fn setup() -> (Scorer, Layout) {
    let layout = KnownLayout::Qwerty.layout().expect("qwerty preset");
    let keys: Vec<char> = layout.keys().collect();

    let mut samples = Vec::new();
    for (i, a) in keys.iter().enumerate().step_by(3) {
        for (j, b) in keys.iter().enumerate().step_by(2) {
            for (k, c) in keys.iter().enumerate().step_by(5) {
                let stroke = layout.tristroke([*a, *b, *c]).expect("keys on layout");
                let first = 80.0 + ((i * 7 + j * 3) % 40) as f64;
                let second = 80.0 + ((j * 5 + k * 11) % 40) as f64;
                samples.push(SpeedSample::new(stroke, first, second));
            }
        }
    }
    let speeds = SpeedModel::from_samples(samples);
    let corpus = Corpus::from_text(&TEXT.repeat(20));

    let scorer = ScorerBuilder::new()
        .with_geometry(layout.shared_geometry())
        .with_speeds(&speeds)
        .with_corpus(&corpus)
        .build()
        .expect("Failed to build scorer");
    (scorer, layout)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (scorer, layout) = setup();
    let swap = Remap::swap('e', 'i');
    let cycle = Remap::cycle(&['a', 's', 'd', 'f']);

    c.bench_function("score (full pass)", |b| {
        b.iter(|| scorer.score(black_box(&layout)))
    });
    c.bench_function("score_delta (swap)", |b| {
        b.iter(|| scorer.score_delta(black_box(&layout), black_box(&swap)))
    });
    c.bench_function("score_delta_scan (swap)", |b| {
        b.iter(|| scorer.score_delta_scan(black_box(&layout), black_box(&swap)))
    });
    c.bench_function("score_delta (4-cycle)", |b| {
        b.iter(|| scorer.score_delta(black_box(&layout), black_box(&cycle)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
