use super::category::{Category, Taxonomy};
use super::types::{CategoryReport, CategoryRow, CategoryStats, FingerStats, ScoreDelta, ScoreStats};
use super::Scorer;
use crate::error::SfResult;
use crate::geometry::{Finger, Hand};
use crate::layout::Layout;
use crate::remap::Remap;
use std::collections::{BTreeSet, HashMap};
use strum::IntoEnumIterator;

#[inline(always)]
fn trigram_index(scorer: &Scorer, layout: &Layout, ngram: &[char; 3]) -> Option<usize> {
    let n = scorer.key_count;
    let mut idx = 0;
    for key in ngram {
        let slot = layout.slot_of(*key).filter(|s| *s < n)?;
        idx = idx * n + slot;
    }
    Some(idx)
}

#[inline(always)]
fn bigram_index(scorer: &Scorer, layout: &Layout, ngram: &[char; 2]) -> Option<usize> {
    let n = scorer.key_count;
    let s0 = layout.slot_of(ngram[0]).filter(|s| *s < n)?;
    let s1 = layout.slot_of(ngram[1]).filter(|s| *s < n)?;
    Some(s0 * n + s1)
}

/// Trigrams with a key missing from the layout are skipped.
pub fn score_full(scorer: &Scorer, layout: &Layout) -> ScoreStats {
    let mut stats = ScoreStats::default();
    for (ngram, count) in &scorer.trigrams {
        if let Some(idx) = trigram_index(scorer, layout, ngram) {
            stats.record(*count, scorer.trigram_exact[idx], scorer.trigram_speeds[idx]);
        }
    }
    stats
}

fn trigram_delta(
    scorer: &Scorer,
    layout: &Layout,
    remap: &Remap,
    ngram: &[char; 3],
    count: u64,
) -> Option<ScoreDelta> {
    let old = trigram_index(scorer, layout, ngram)?;
    let new = trigram_index(scorer, layout, &remap.translate(*ngram))?;
    let mut delta = ScoreDelta::default();
    delta.record(count, scorer.trigram_exact[old], scorer.trigram_speeds[old], -1);
    delta.record(count, scorer.trigram_exact[new], scorer.trigram_speeds[new], 1);
    Some(delta)
}

fn affected_trigrams(scorer: &Scorer, remap: &Remap) -> Vec<u32> {
    let mut affected: Vec<u32> = remap
        .keys()
        .filter_map(|k| scorer.trigrams_by_key.get(&k))
        .flatten()
        .copied()
        .collect();
    affected.sort_unstable();
    affected.dedup();
    affected
}

pub fn score_delta(scorer: &Scorer, layout: &Layout, remap: &Remap) -> SfResult<ScoreDelta> {
    layout.check_remap(remap)?;
    let mut total = ScoreDelta::default();
    for idx in affected_trigrams(scorer, remap) {
        let (ngram, count) = &scorer.trigrams[idx as usize];
        if let Some(delta) = trigram_delta(scorer, layout, remap, ngram, *count) {
            total += delta;
        }
    }
    Ok(total)
}

pub fn score_delta_scan(scorer: &Scorer, layout: &Layout, remap: &Remap) -> SfResult<ScoreDelta> {
    layout.check_remap(remap)?;
    let mut total = ScoreDelta::default();
    for (ngram, count) in &scorer.trigrams {
        if !ngram.iter().any(|k| remap.touches(*k)) {
            continue;
        }
        if let Some(delta) = trigram_delta(scorer, layout, remap, ngram, *count) {
            total += delta;
        }
    }
    Ok(total)
}

/// Delta of every affected trigram, most frequent first.
pub fn ngram_deltas(
    scorer: &Scorer,
    layout: &Layout,
    remap: &Remap,
) -> SfResult<Vec<([char; 3], ScoreDelta)>> {
    layout.check_remap(remap)?;
    Ok(affected_trigrams(scorer, remap)
        .into_iter()
        .filter_map(|idx| {
            let (ngram, count) = &scorer.trigrams[idx as usize];
            trigram_delta(scorer, layout, remap, ngram, *count).map(|d| (*ngram, d))
        })
        .collect())
}

/// Fills aggregate rows from their member leaves and derives the
/// proportional stats.
fn build_report(
    taxonomy: Taxonomy,
    leaves: &HashMap<Category, ScoreStats>,
    unmeasured: u64,
) -> CategoryReport {
    let raw: Vec<(Category, ScoreStats)> = taxonomy
        .categories()
        .iter()
        .map(|&cat| {
            let mut sum = ScoreStats::default();
            for leaf in cat.members(taxonomy) {
                if let Some(s) = leaves.get(&leaf) {
                    sum += s;
                }
            }
            (cat, sum)
        })
        .collect();

    let total_count = raw
        .iter()
        .find(|(c, _)| *c == Category::Total)
        .map(|(_, s)| s.count)
        .unwrap_or(0)
        .max(1) as f64;

    let rows = raw
        .into_iter()
        .map(|(category, s)| {
            let cat_count = s.count.max(1) as f64;
            CategoryRow {
                category,
                raw: s,
                stats: CategoryStats {
                    freq_prop: s.count as f64 / total_count,
                    known_prop: s.known as f64 / cat_count,
                    speed: s.total_time / cat_count,
                    contribution: s.total_time / total_count,
                },
            }
        })
        .collect();

    CategoryReport {
        taxonomy,
        rows,
        unmeasured,
    }
}

pub fn analyze_tristrokes(scorer: &Scorer, layout: &Layout) -> CategoryReport {
    let mut leaves: HashMap<Category, ScoreStats> = HashMap::new();
    let mut unmeasured = 0;
    for (ngram, count) in &scorer.trigrams {
        let Some(idx) = trigram_index(scorer, layout, ngram) else {
            continue;
        };
        if !scorer.trigram_has_data[idx] {
            unmeasured += count;
        }
        leaves
            .entry(scorer.trigram_categories[idx])
            .or_default()
            .record(*count, scorer.trigram_exact[idx], scorer.trigram_speeds[idx]);
    }
    build_report(Taxonomy::Tristroke, &leaves, unmeasured)
}

pub fn analyze_bistrokes(scorer: &Scorer, layout: &Layout) -> CategoryReport {
    let mut leaves: HashMap<Category, ScoreStats> = HashMap::new();
    for (ngram, count) in &scorer.bigrams {
        let Some(idx) = bigram_index(scorer, layout, ngram) else {
            continue;
        };
        leaves
            .entry(scorer.bigram_categories[idx])
            .or_default()
            .record(*count, scorer.bigram_exact[idx], scorer.bigram_speeds[idx]);
    }
    build_report(Taxonomy::Bistroke, &leaves, 0)
}

fn finger_type(finger: Finger) -> Option<&'static str> {
    match finger.reach() {
        1 => Some("thumb"),
        2 => Some("index"),
        3 => Some("middle"),
        4 => Some("ring"),
        5 => Some("pinky"),
        _ => None,
    }
}

fn finger_labels(finger: Finger) -> Vec<String> {
    let mut labels = vec![finger.to_string()];
    if let Some(hand) = finger.hand() {
        labels.push(
            match hand {
                Hand::Left => "left hand",
                Hand::Right => "right hand",
            }
            .to_string(),
        );
    }
    if let Some(t) = finger_type(finger) {
        labels.push(t.to_string());
    }
    labels
}

/// Usage and timing per finger, per hand and per finger type. A trigram
/// counts once towards every group any of its fingers belongs to.
pub fn analyze_fingers(scorer: &Scorer, layout: &Layout) -> Vec<FingerStats> {
    let mut order: Vec<String> = Finger::iter().map(|f| f.to_string()).collect();
    order.extend(["left hand", "right hand"].map(String::from));
    order.extend(["thumb", "index", "middle", "ring", "pinky"].map(String::from));

    let mut key_counts: HashMap<String, u64> = HashMap::new();
    let mut total_keys = 0u64;
    for key in layout.keys() {
        let count = scorer.key_counts.get(&key).copied().unwrap_or(0);
        total_keys += count;
        if let Some(finger) = layout.finger_of(key) {
            for label in finger_labels(finger) {
                *key_counts.entry(label).or_insert(0) += count;
            }
        }
    }

    let nodes = &scorer.geometry.keys;
    let mut trigram_stats: HashMap<String, ScoreStats> = HashMap::new();
    let mut total_trigrams = 0u64;
    for (ngram, count) in &scorer.trigrams {
        let Some(idx) = trigram_index(scorer, layout, ngram) else {
            continue;
        };
        total_trigrams += count;
        let labels: BTreeSet<String> = ngram
            .iter()
            .filter_map(|k| layout.slot_of(*k))
            .flat_map(|slot| finger_labels(nodes[slot].finger))
            .collect();
        for label in labels {
            trigram_stats.entry(label).or_default().record(
                *count,
                scorer.trigram_exact[idx],
                scorer.trigram_speeds[idx],
            );
        }
    }

    let ratio = |num: f64, den: u64| if den == 0 { 0.0 } else { num / den as f64 };
    order
        .into_iter()
        .map(|label| {
            let s = trigram_stats.get(&label).copied().unwrap_or_default();
            FingerStats {
                key_freq: ratio(key_counts.get(&label).copied().unwrap_or(0) as f64, total_keys),
                trigram_freq: ratio(s.count as f64, total_trigrams),
                known_prop: s.known_prop(),
                mean_ms: s.score(),
                contribution: ratio(s.total_time, total_trigrams),
                label,
            }
        })
        .collect()
}
