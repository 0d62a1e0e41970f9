use super::mutation::{random_col_swap, random_row_swap};
use crate::constraint::ConstraintMap;
use crate::error::SfResult;
use crate::layout::Layout;
use crate::remap::Remap;
use crate::scorer::{ScoreStats, Scorer};
use fastrand::Rng;
use std::collections::HashMap;
use tracing::debug;

pub const T0: f64 = 10.0;
pub const TF: f64 = 1e-3;

const ROW_SWAP_EVERY: usize = 100;
const COL_SWAP_EVERY: usize = 10;

/// Exponential cooling from `T0` at step 0 towards `TF` at `iterations`.
pub fn temperature(step: usize, iterations: usize) -> f64 {
    if iterations == 0 {
        return T0;
    }
    T0 * (-(T0 / TF).ln() * step as f64 / iterations as f64).exp()
}

/// Metropolis rule: improvements and ties always pass, a worsening of
/// `delta` passes with probability `exp(-delta / temperature)`.
pub fn metropolis_accept(delta: f64, temperature: f64, rng: &mut Rng) -> bool {
    if delta <= 0.0 {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }
    rng.f64() < (-delta / temperature).exp()
}

#[derive(Debug, Clone)]
pub struct AnnealStep {
    pub layout: Layout,
    pub step: usize,
    pub temperature: f64,
    pub delta: f64,
    pub score: f64,
    pub remap: Remap,
}

/// Simulated annealing for a fixed number of iterations. Only accepted
/// moves are yielded; rejected ones leave the layout untouched.
pub struct Anneal<'a> {
    scorer: &'a Scorer,
    constraints: &'a ConstraintMap,
    layout: Layout,
    stats: ScoreStats,
    pins: Vec<char>,
    key_freqs: HashMap<char, f64>,
    step: usize,
    iterations: usize,
    rng: Rng,
}

impl<'a> Anneal<'a> {
    pub fn new(
        scorer: &'a Scorer,
        constraints: &'a ConstraintMap,
        layout: &Layout,
        pins: &[char],
        iterations: usize,
        seed: Option<u64>,
    ) -> SfResult<Self> {
        scorer.check_layout(layout)?;
        let layout = layout.renamed(&format!("{}-annealed", layout.name));
        let rng = match seed {
            Some(s) => Rng::with_seed(s),
            None => Rng::new(),
        };
        debug!("Anneal on '{}': {} iterations", layout.name, iterations);
        Ok(Self {
            stats: scorer.score(&layout),
            key_freqs: scorer.key_frequencies(&layout),
            scorer,
            constraints,
            pins: pins.to_vec(),
            layout,
            step: 0,
            iterations,
            rng,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn stats(&self) -> ScoreStats {
        self.stats
    }

    /// Steps taken so far, accepted or not.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    fn legal(&self, remap: &Remap) -> bool {
        !remap.is_empty() && self.constraints.is_remap_legal(&self.layout, &self.key_freqs, remap)
    }

    fn propose(&mut self, step: usize) -> Option<Remap> {
        let try_row = step % ROW_SWAP_EVERY == 0;
        let mut structural = None;
        if try_row {
            structural = random_row_swap(&self.layout, &self.pins, &mut self.rng)
                .filter(|r| self.legal(r));
        }
        if structural.is_none() && (try_row || step % COL_SWAP_EVERY == 0) {
            structural = random_col_swap(&self.layout, &self.pins, &mut self.rng)
                .filter(|r| self.legal(r));
        }
        if structural.is_some() {
            return structural;
        }
        self.constraints
            .random_legal_swap(&self.layout, &self.key_freqs, &self.pins, &mut self.rng)
            .ok()
    }
}

impl Iterator for Anneal<'_> {
    type Item = AnnealStep;

    fn next(&mut self) -> Option<AnnealStep> {
        while self.step < self.iterations {
            let step = self.step;
            self.step += 1;
            let temp = temperature(step, self.iterations);

            let Some(remap) = self.propose(step) else {
                continue;
            };
            let Ok(stats) = self.scorer.remapped_score(&self.layout, self.stats, &remap) else {
                continue;
            };
            let delta = stats.score() - self.stats.score();
            if !metropolis_accept(delta, temp, &mut self.rng) {
                continue;
            }
            if self.layout.apply_remap(&remap).is_err() {
                continue;
            }
            self.stats = stats;
            return Some(AnnealStep {
                layout: self.layout.clone(),
                step,
                temperature: temp,
                delta,
                score: stats.score(),
                remap,
            });
        }
        None
    }
}
