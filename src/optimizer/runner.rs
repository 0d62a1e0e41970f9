use super::anneal::Anneal;
use super::ascent::SteepestAscent;
use crate::config::Config;
use crate::constraint::ConstraintMap;
use crate::error::SfResult;
use crate::layout::Layout;
use crate::remap::Remap;
use crate::scorer::{ScoreStats, Scorer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct OptimizationOptions {
    /// Zero uses every core.
    pub num_threads: usize,
    pub iterations: usize,
    pub seed: Option<u64>,
    pub pinned_keys: Vec<char>,
    /// Stop after this many accepted steps. Zero means no limit.
    pub max_steps: usize,
    pub max_time: Option<Duration>,
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            num_threads: cfg.search.threads,
            iterations: cfg.search.iterations,
            seed: cfg.search.seed,
            pinned_keys: cfg.search.pinned_keys(),
            max_steps: cfg.search.max_steps,
            max_time: (cfg.search.max_seconds > 0)
                .then(|| Duration::from_secs(cfg.search.max_seconds)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub layout: Layout,
    pub score: f64,
    pub stats: ScoreStats,
    /// Applying this to the starting layout gives `layout`.
    pub total_remap: Remap,
    pub steps: usize,
}

/// Receives every accepted step. Returning false stops the search at the
/// next step boundary.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, step: usize, score: f64, layout: &Layout, remap: &Remap) -> bool;
}

/// Callback that never stops the search.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _: usize, _: f64, _: &Layout, _: &Remap) -> bool {
        true
    }
}

pub struct Optimizer {
    scorer: Arc<Scorer>,
    constraints: Arc<ConstraintMap>,
    options: OptimizationOptions,
}

struct Tracker<'a, CB: ProgressCallback> {
    options: &'a OptimizationOptions,
    callback: &'a CB,
    start: Instant,
    steps: usize,
    total: Remap,
}

impl<'a, CB: ProgressCallback> Tracker<'a, CB> {
    fn new(options: &'a OptimizationOptions, callback: &'a CB) -> Self {
        Self {
            options,
            callback,
            start: Instant::now(),
            steps: 0,
            total: Remap::new(),
        }
    }

    /// Folds one accepted step in. Returns false once the run should stop.
    fn accept(&mut self, index: usize, score: f64, layout: &Layout, remap: &Remap) -> bool {
        self.total = remap_after(&self.total, remap);
        self.steps += 1;
        if !self.callback.on_progress(index, score, layout, remap) {
            return false;
        }
        if self.options.max_steps > 0 && self.steps >= self.options.max_steps {
            return false;
        }
        match self.options.max_time {
            Some(limit) => self.start.elapsed() < limit,
            None => true,
        }
    }
}

/// The running total after `step` is applied on top of `total`.
fn remap_after(total: &Remap, step: &Remap) -> Remap {
    step + total
}

impl Optimizer {
    pub fn new(
        scorer: Arc<Scorer>,
        constraints: Arc<ConstraintMap>,
        options: OptimizationOptions,
    ) -> Self {
        Self {
            scorer,
            constraints,
            options,
        }
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    pub fn run_ascent<CB: ProgressCallback>(
        &self,
        layout: &Layout,
        callback: CB,
    ) -> SfResult<OptimizationResult> {
        let opts = &self.options;
        let mut search = SteepestAscent::new(
            &self.scorer,
            &self.constraints,
            layout,
            &opts.pinned_keys,
            opts.num_threads,
        )?;
        info!("Steepest ascent from {:.4}", search.stats().score());

        let mut tracker = Tracker::new(opts, &callback);
        for (i, step) in search.by_ref().enumerate() {
            if !tracker.accept(i + 1, step.score, &step.layout, &step.remap) {
                break;
            }
        }

        let stats = search.stats();
        info!("Ascent finished after {} steps at {:.4}", tracker.steps, stats.score());
        Ok(OptimizationResult {
            layout: search.layout().clone(),
            score: stats.score(),
            stats,
            total_remap: tracker.total,
            steps: tracker.steps,
        })
    }

    pub fn run_anneal<CB: ProgressCallback>(
        &self,
        layout: &Layout,
        callback: CB,
    ) -> SfResult<OptimizationResult> {
        let opts = &self.options;
        let mut search = Anneal::new(
            &self.scorer,
            &self.constraints,
            layout,
            &opts.pinned_keys,
            opts.iterations,
            opts.seed,
        )?;
        info!(
            "Annealing {} iterations from {:.4}",
            opts.iterations,
            search.stats().score()
        );

        let mut tracker = Tracker::new(opts, &callback);
        for step in search.by_ref() {
            if !tracker.accept(step.step, step.score, &step.layout, &step.remap) {
                break;
            }
        }

        let stats = search.stats();
        info!(
            "Anneal finished: {} accepted of {} steps, final {:.4}",
            tracker.steps,
            search.steps_taken(),
            stats.score()
        );
        Ok(OptimizationResult {
            layout: search.layout().clone(),
            score: stats.score(),
            stats,
            total_remap: tracker.total,
            steps: tracker.steps,
        })
    }
}
