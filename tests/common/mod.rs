#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use strokeforge::corpus::Corpus;
use strokeforge::geometry::{Finger, KeyNode, KeyboardGeometry};
use strokeforge::layout::Layout;
use strokeforge::layouts::KnownLayout;
use strokeforge::scorer::{Scorer, ScorerBuilder, SpeedModel, SpeedSample};

pub const TEXT: &str = "the quick brown fox jumps over the lazy dog, then sits; \
    a wizard's job is to vex chumps quickly in fog. pack my box with five dozen liquor jugs. \
    sphinx of black quartz, judge my vow/";

pub fn node(row: i32, col: i32, finger: Finger, x: f64, y: f64) -> KeyNode {
    KeyNode {
        row,
        col,
        finger,
        x,
        y,
    }
}

pub fn qwerty() -> Layout {
    KnownLayout::Qwerty.layout().expect("qwerty preset")
}

/// Times that depend only on slot indices, so every sampled stroke has
/// its own fixed median.
pub fn slot_times(s: [usize; 3]) -> (f64, f64) {
    let first = 60.0 + ((s[0] * 7 + s[1] * 13 + 3) % 17) as f64 * 5.0;
    let second = 60.0 + ((s[1] * 11 + s[2] * 5 + 1) % 19) as f64 * 4.0;
    (first, second)
}

/// One sample per slot trigram, restricted to slots accepted by `keep`.
pub fn sampled_speeds<F>(layout: &Layout, keep: F) -> SpeedModel
where
    F: Fn([usize; 3]) -> bool,
{
    let keys: Vec<char> = layout.keys().collect();
    let mut samples = Vec::new();
    for a in 0..keys.len() {
        for b in 0..keys.len() {
            for c in 0..keys.len() {
                if !keep([a, b, c]) {
                    continue;
                }
                let stroke = layout
                    .tristroke([keys[a], keys[b], keys[c]])
                    .expect("keys on layout");
                let (first, second) = slot_times([a, b, c]);
                samples.push(SpeedSample::new(stroke, first, second));
            }
        }
    }
    SpeedModel::from_samples(samples)
}

pub fn build(layout: &Layout, speeds: &SpeedModel, corpus: &Corpus) -> Scorer {
    ScorerBuilder::new()
        .with_geometry(layout.shared_geometry())
        .with_speeds(speeds)
        .with_corpus(corpus)
        .build()
        .expect("scorer")
}

/// Speeds for roughly a third of all standard-board strokes. Built once
/// per test binary.
pub fn qwerty_speeds() -> &'static SpeedModel {
    static SPEEDS: OnceLock<SpeedModel> = OnceLock::new();
    SPEEDS.get_or_init(|| sampled_speeds(&qwerty(), |s| (s[0] + s[1] + s[2]) % 3 != 0))
}

/// Qwerty speeds scored against `TEXT`. Built once per test binary.
pub fn qwerty_scorer() -> &'static Scorer {
    static SCORER: OnceLock<Scorer> = OnceLock::new();
    SCORER.get_or_init(|| {
        let corpus = Corpus::from_text(&TEXT.repeat(3));
        build(&qwerty(), qwerty_speeds(), &corpus)
    })
}

/// A single row of three keys: two on the left hand, one on the right.
pub fn tiny_board() -> Arc<KeyboardGeometry> {
    Arc::new(
        KeyboardGeometry::new(
            "tiny",
            vec![
                node(0, 0, Finger::LM, 0.0, 0.0),
                node(0, 1, Finger::LI, 1.0, 0.0),
                node(0, 2, Finger::RI, 4.0, 0.0),
            ],
        )
        .expect("tiny board"),
    )
}

pub fn corpus_of(ngrams: &[(&str, u64)]) -> Corpus {
    let mut corpus = Corpus::new();
    for (ngram, count) in ngrams {
        corpus.add(ngram, *count);
    }
    corpus.finish();
    corpus
}
