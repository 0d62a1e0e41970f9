use super::mutation::{structural_candidates, swap_candidates};
use crate::constraint::ConstraintMap;
use crate::error::SfResult;
use crate::layout::Layout;
use crate::remap::Remap;
use crate::scorer::{ScoreStats, Scorer};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashMap;
use tracing::debug;

/// Relative margin a candidate must beat the current score by.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct AscentStep {
    pub layout: Layout,
    pub score: f64,
    pub stats: ScoreStats,
    pub remap: Remap,
}

pub(crate) fn improves(candidate: f64, current: f64) -> bool {
    candidate < current - IMPROVEMENT_EPSILON * current.abs().max(1.0)
}

/// Steepest-ascent search over key swaps, row swaps and column swaps.
/// Every item is a strictly better layout; the iterator ends at a local
/// optimum.
pub struct SteepestAscent<'a> {
    scorer: &'a Scorer,
    constraints: &'a ConstraintMap,
    layout: Layout,
    stats: ScoreStats,
    pins: Vec<char>,
    swaps: Vec<Remap>,
    key_freqs: HashMap<char, f64>,
    pool: ThreadPool,
    done: bool,
}

impl<'a> SteepestAscent<'a> {
    /// `threads == 0` sizes the pool to the machine.
    pub fn new(
        scorer: &'a Scorer,
        constraints: &'a ConstraintMap,
        layout: &Layout,
        pins: &[char],
        threads: usize,
    ) -> SfResult<Self> {
        scorer.check_layout(layout)?;
        let layout = layout.renamed(&format!("{}-ascended", layout.name));
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        let swaps = swap_candidates(&layout, pins);
        debug!(
            "Ascent on '{}': {} swap candidates, {} worker threads",
            layout.name,
            swaps.len(),
            pool.current_num_threads()
        );
        Ok(Self {
            stats: scorer.score(&layout),
            key_freqs: scorer.key_frequencies(&layout),
            scorer,
            constraints,
            pins: pins.to_vec(),
            swaps,
            pool,
            layout,
            done: false,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn stats(&self) -> ScoreStats {
        self.stats
    }

    fn legal_candidates(&self) -> Vec<Remap> {
        // swaps are fixed by key, only structural moves depend on the layout
        self.swaps
            .iter()
            .cloned()
            .chain(structural_candidates(&self.layout, &self.pins))
            .filter(|r| self.constraints.is_remap_legal(&self.layout, &self.key_freqs, r))
            .collect()
    }

    fn best_candidate(&self, candidates: Vec<Remap>) -> Option<(Remap, ScoreStats)> {
        let (scorer, layout, baseline) = (self.scorer, &self.layout, self.stats);
        let scored: Vec<Option<ScoreStats>> = self.pool.install(|| {
            candidates
                .par_iter()
                .map(|remap| scorer.remapped_score(layout, baseline, remap).ok())
                .collect()
        });

        let mut best: Option<(usize, ScoreStats)> = None;
        for (i, stats) in scored.into_iter().enumerate() {
            let Some(stats) = stats else { continue };
            match best {
                Some((_, b)) if b.score() <= stats.score() => {}
                _ => best = Some((i, stats)),
            }
        }
        let (i, stats) = best?;
        candidates.into_iter().nth(i).map(|remap| (remap, stats))
    }
}

impl Iterator for SteepestAscent<'_> {
    type Item = AscentStep;

    fn next(&mut self) -> Option<AscentStep> {
        if self.done {
            return None;
        }
        let candidates = self.legal_candidates();
        if candidates.is_empty() {
            debug!("Ascent: no legal candidates");
            self.done = true;
            return None;
        }

        let current = self.stats.score();
        let Some((remap, stats)) = self.best_candidate(candidates) else {
            self.done = true;
            return None;
        };
        if !improves(stats.score(), current) {
            debug!("Ascent: local optimum at {:.4}", current);
            self.done = true;
            return None;
        }
        if self.layout.apply_remap(&remap).is_err() {
            self.done = true;
            return None;
        }
        self.stats = stats;
        debug!("Ascent: {:.4} -> {:.4} via {}", current, stats.score(), remap);

        Some(AscentStep {
            layout: self.layout.clone(),
            score: stats.score(),
            stats,
            remap,
        })
    }
}
