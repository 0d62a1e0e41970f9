use super::speed::SpeedModel;
use super::stroke::Nstroke;
use super::Scorer;
use crate::corpus::Corpus;
use crate::error::{SfResult, StrokeForgeError};
use crate::geometry::KeyboardGeometry;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub fn build_scorer(
    geometry: Arc<KeyboardGeometry>,
    speeds: &SpeedModel,
    corpus: &Corpus,
    precision: usize,
) -> SfResult<Scorer> {
    let n = geometry.len();
    if n == 0 {
        return Err(StrokeForgeError::Validation("Geometry has 0 keys".to_string()));
    }
    let nodes = &geometry.keys;

    let trigram_table: Vec<_> = (0..n * n * n)
        .into_par_iter()
        .map(|idx| {
            let (s0, s1, s2) = (idx / (n * n), (idx / n) % n, idx % n);
            let stroke = Nstroke::new(
                [nodes[s0].finger, nodes[s1].finger, nodes[s2].finger],
                [nodes[s0].coord(), nodes[s1].coord(), nodes[s2].coord()],
            );
            (
                speeds.estimate(&stroke),
                speeds.classifier().tristroke(&stroke),
            )
        })
        .collect();

    let bigram_table: Vec<_> = (0..n * n)
        .into_par_iter()
        .map(|idx| {
            let (s0, s1) = (idx / n, idx % n);
            let stroke = Nstroke::new(
                [nodes[s0].finger, nodes[s1].finger],
                [nodes[s0].coord(), nodes[s1].coord()],
            );
            (
                speeds.bistroke_estimate(&stroke),
                speeds.classifier().bistroke(&stroke),
            )
        })
        .collect();

    let limited = corpus.with_precision(precision);
    let mut trigrams_by_key: HashMap<char, Vec<u32>> = HashMap::new();
    for (idx, (ngram, _)) in limited.trigrams.iter().enumerate() {
        for (i, key) in ngram.iter().enumerate() {
            // each trigram is listed once per distinct key
            if ngram[..i].contains(key) {
                continue;
            }
            trigrams_by_key.entry(*key).or_default().push(idx as u32);
        }
    }

    let exact_slots = trigram_table.iter().filter(|(e, _)| e.exact).count();
    debug!(
        "Scorer: {} slots, {}/{} exact tristrokes, {} trigrams, {} bigrams",
        n,
        exact_slots,
        trigram_table.len(),
        limited.trigrams.len(),
        limited.bigrams.len()
    );

    Ok(Scorer {
        key_count: n,
        trigram_speeds: trigram_table.iter().map(|(e, _)| e.ms).collect(),
        trigram_exact: trigram_table.iter().map(|(e, _)| e.exact).collect(),
        trigram_has_data: trigram_table.iter().map(|(e, _)| e.has_data).collect(),
        trigram_categories: trigram_table.iter().map(|(_, c)| *c).collect(),
        bigram_speeds: bigram_table.iter().map(|(e, _)| e.ms).collect(),
        bigram_exact: bigram_table.iter().map(|(e, _)| e.exact).collect(),
        bigram_categories: bigram_table.iter().map(|(_, c)| *c).collect(),
        trigrams: limited.trigrams,
        bigrams: limited.bigrams,
        key_counts: limited.key_counts,
        trigrams_by_key,
        geometry,
    })
}

/// Collects the inputs of [`build_scorer`].
#[derive(Default)]
pub struct ScorerBuilder<'a> {
    geometry: Option<Arc<KeyboardGeometry>>,
    speeds: Option<&'a SpeedModel>,
    corpus: Option<&'a Corpus>,
    precision: usize,
}

impl<'a> ScorerBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(mut self, geometry: Arc<KeyboardGeometry>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_speeds(mut self, speeds: &'a SpeedModel) -> Self {
        self.speeds = Some(speeds);
        self
    }

    pub fn with_corpus(mut self, corpus: &'a Corpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Only the `precision` most frequent trigrams are scored; 0 keeps all.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn build(self) -> SfResult<Scorer> {
        let geometry = self
            .geometry
            .ok_or_else(|| StrokeForgeError::Config("Scorer needs a geometry".to_string()))?;
        let speeds = self
            .speeds
            .ok_or_else(|| StrokeForgeError::Config("Scorer needs speed data".to_string()))?;
        let corpus = self
            .corpus
            .ok_or_else(|| StrokeForgeError::Config("Scorer needs a corpus".to_string()))?;
        build_scorer(geometry, speeds, corpus, self.precision)
    }
}
