use crate::scorer::category::{Category, Taxonomy};
use std::ops::{Add, AddAssign};

/// Corpus-weighted timing totals over a set of n-grams.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub count: u64,
    /// Occurrences whose speed came from exact samples.
    pub known: u64,
    pub total_time: f64,
}

/// Difference between two [`ScoreStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScoreDelta {
    pub count: i64,
    pub known: i64,
    pub total_time: f64,
}

impl ScoreStats {
    pub fn record(&mut self, count: u64, exact: bool, ms: f64) {
        self.count += count;
        if exact {
            self.known += count;
        }
        self.total_time += ms * count as f64;
    }

    /// Mean milliseconds per n-gram; lower is better.
    pub fn score(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_time / self.count as f64
        }
    }

    pub fn known_prop(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.known as f64 / self.count as f64
        }
    }
}

impl AddAssign<&ScoreStats> for ScoreStats {
    fn add_assign(&mut self, rhs: &ScoreStats) {
        self.count += rhs.count;
        self.known += rhs.known;
        self.total_time += rhs.total_time;
    }
}

impl Add<ScoreDelta> for ScoreStats {
    type Output = ScoreStats;

    fn add(self, delta: ScoreDelta) -> ScoreStats {
        ScoreStats {
            count: self.count.saturating_add_signed(delta.count),
            known: self.known.saturating_add_signed(delta.known),
            total_time: self.total_time + delta.total_time,
        }
    }
}

impl ScoreDelta {
    pub fn record(&mut self, count: u64, exact: bool, ms: f64, sign: i64) {
        let count = count as i64 * sign;
        self.count += count;
        if exact {
            self.known += count;
        }
        self.total_time += ms * count as f64;
    }
}

impl AddAssign for ScoreDelta {
    fn add_assign(&mut self, rhs: ScoreDelta) {
        self.count += rhs.count;
        self.known += rhs.known;
        self.total_time += rhs.total_time;
    }
}

/// (frequency share, exact share, mean speed, contribution to the total).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CategoryStats {
    pub freq_prop: f64,
    pub known_prop: f64,
    pub speed: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: Category,
    pub raw: ScoreStats,
    pub stats: CategoryStats,
}

/// Per-category breakdown of one layout, in taxonomy order. Aggregate
/// rows are always the sum of their member leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub taxonomy: Taxonomy,
    pub rows: Vec<CategoryRow>,
    /// Occurrences for which no speed data existed anywhere.
    pub unmeasured: u64,
}

impl CategoryReport {
    pub fn get(&self, category: Category) -> Option<&CategoryRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    pub fn total(&self) -> ScoreStats {
        self.get(Category::Total).map(|r| r.raw).unwrap_or_default()
    }
}

/// Per-finger (or per-hand, per-finger-type) usage and timing.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerStats {
    pub label: String,
    pub key_freq: f64,
    pub trigram_freq: f64,
    pub known_prop: f64,
    pub mean_ms: f64,
    pub contribution: f64,
}
