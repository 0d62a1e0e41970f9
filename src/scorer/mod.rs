pub mod category;
pub mod engine;
pub mod flow;
pub mod loader;
pub mod physics;
pub mod setup;
pub mod speed;
pub mod stroke;
pub mod types;

pub use self::category::{Category, Taxonomy};
pub use self::setup::ScorerBuilder;
pub use self::speed::{SpeedEstimate, SpeedModel, SpeedSample};
pub use self::stroke::{Bistroke, Nstroke, Tristroke};
pub use self::types::{CategoryReport, CategoryStats, FingerStats, ScoreDelta, ScoreStats};

use crate::error::{SfResult, StrokeForgeError};
use crate::geometry::KeyboardGeometry;
use crate::layout::Layout;
use crate::remap::Remap;
use std::collections::HashMap;
use std::sync::Arc;

/// Precomputed speed tables for one board plus the corpus they are
/// weighted by. Everything is read-only after construction, so one scorer
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub geometry: Arc<KeyboardGeometry>,
    pub key_count: usize,

    // --- Slot Tables (flattened, s0 * n * n + s1 * n + s2) ---
    pub trigram_speeds: Vec<f64>,
    pub trigram_exact: Vec<bool>,
    pub trigram_has_data: Vec<bool>,
    pub trigram_categories: Vec<Category>,

    // s0 * n + s1
    pub bigram_speeds: Vec<f64>,
    pub bigram_exact: Vec<bool>,
    pub bigram_categories: Vec<Category>,

    // --- Corpus ---
    pub trigrams: Vec<([char; 3], u64)>,
    pub bigrams: Vec<([char; 2], u64)>,
    pub key_counts: HashMap<char, u64>,
    /// Indices into `trigrams` for every trigram containing a key.
    pub trigrams_by_key: HashMap<char, Vec<u32>>,
}

impl Scorer {
    /// The layout must sit on the board this scorer was built for.
    pub fn check_layout(&self, layout: &Layout) -> SfResult<()> {
        if layout.geometry() != self.geometry.as_ref() {
            return Err(StrokeForgeError::Validation(format!(
                "Layout '{}' is on board '{}', scorer was built for '{}'",
                layout.name,
                layout.geometry().name,
                self.geometry.name
            )));
        }
        Ok(())
    }

    /// Full pass over the corpus trigrams.
    pub fn score(&self, layout: &Layout) -> ScoreStats {
        engine::score_full(self, layout)
    }

    /// Change in stats if `remap` were applied, touching only the trigrams
    /// that contain a remapped key.
    pub fn score_delta(&self, layout: &Layout, remap: &Remap) -> SfResult<ScoreDelta> {
        engine::score_delta(self, layout, remap)
    }

    /// Same result as [`Scorer::score_delta`] from a scan of the whole
    /// trigram table.
    pub fn score_delta_scan(&self, layout: &Layout, remap: &Remap) -> SfResult<ScoreDelta> {
        engine::score_delta_scan(self, layout, remap)
    }

    pub fn remapped_score(
        &self,
        layout: &Layout,
        baseline: ScoreStats,
        remap: &Remap,
    ) -> SfResult<ScoreStats> {
        Ok(baseline + self.score_delta(layout, remap)?)
    }

    pub fn ngram_deltas(
        &self,
        layout: &Layout,
        remap: &Remap,
    ) -> SfResult<Vec<([char; 3], ScoreDelta)>> {
        engine::ngram_deltas(self, layout, remap)
    }

    pub fn analyze(&self, layout: &Layout) -> CategoryReport {
        engine::analyze_tristrokes(self, layout)
    }

    pub fn analyze_bistrokes(&self, layout: &Layout) -> CategoryReport {
        engine::analyze_bistrokes(self, layout)
    }

    pub fn analyze_fingers(&self, layout: &Layout) -> Vec<FingerStats> {
        engine::analyze_fingers(self, layout)
    }

    /// Key frequencies used by the legality checks.
    pub fn key_frequencies(&self, layout: &Layout) -> HashMap<char, f64> {
        crate::corpus::normalized_key_frequencies(&self.key_counts, layout)
    }
}
