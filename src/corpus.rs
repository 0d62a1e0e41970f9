use crate::layout::Layout;
use std::collections::HashMap;

/// N-gram occurrence counts. Bigrams and trigrams are kept sorted by
/// descending count (ties broken by n-gram) so that precision limits take
/// a stable top-K.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub key_counts: HashMap<char, u64>,
    pub bigrams: Vec<([char; 2], u64)>,
    pub trigrams: Vec<([char; 3], u64)>,
}

fn sort_desc<T: Ord>(table: &mut [(T, u64)]) {
    table.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds counts for a 1-, 2- or 3-character n-gram. Other lengths are
    /// ignored. Call [`Corpus::finish`] after the last insertion.
    pub fn add(&mut self, ngram: &str, count: u64) -> bool {
        let chars: Vec<char> = ngram.chars().collect();
        match chars.as_slice() {
            [a] => *self.key_counts.entry(*a).or_insert(0) += count,
            [a, b] => self.bigrams.push(([*a, *b], count)),
            [a, b, c] => self.trigrams.push(([*a, *b, *c], count)),
            _ => return false,
        }
        true
    }

    /// Merges duplicate entries and restores count order.
    pub fn finish(&mut self) {
        self.bigrams = merge(std::mem::take(&mut self.bigrams));
        self.trigrams = merge(std::mem::take(&mut self.trigrams));
    }

    /// Builds a corpus from raw text, counting every overlapping n-gram.
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut corpus = Self::new();
        for c in &chars {
            *corpus.key_counts.entry(*c).or_insert(0) += 1;
        }
        for w in chars.windows(2) {
            corpus.bigrams.push(([w[0], w[1]], 1));
        }
        for w in chars.windows(3) {
            corpus.trigrams.push(([w[0], w[1], w[2]], 1));
        }
        corpus.finish();
        corpus
    }

    pub fn is_empty(&self) -> bool {
        self.key_counts.is_empty() && self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    /// Keeps only the `top` most frequent trigrams. Zero means unrestricted.
    pub fn with_precision(&self, top: usize) -> Self {
        let mut limited = self.clone();
        if top > 0 && limited.trigrams.len() > top {
            limited.trigrams.truncate(top);
        }
        limited
    }

    pub fn trigram_total(&self) -> u64 {
        self.trigrams.iter().map(|(_, c)| c).sum()
    }

    /// Single-key counts normalized over the keys present on `layout`.
    pub fn key_frequencies(&self, layout: &Layout) -> HashMap<char, f64> {
        normalized_key_frequencies(&self.key_counts, layout)
    }
}

/// Relative frequency of every key on `layout`; keys the counts never
/// mention get zero.
pub fn normalized_key_frequencies(
    key_counts: &HashMap<char, u64>,
    layout: &Layout,
) -> HashMap<char, f64> {
    let count_of = |k: char| key_counts.get(&k).copied().unwrap_or(0);
    let total: u64 = layout.keys().map(count_of).sum();
    layout
        .keys()
        .map(|k| {
            let freq = if total == 0 {
                0.0
            } else {
                count_of(k) as f64 / total as f64
            };
            (k, freq)
        })
        .collect()
}

fn merge<T: Ord + std::hash::Hash + Copy>(table: Vec<(T, u64)>) -> Vec<(T, u64)> {
    let mut merged: HashMap<T, u64> = HashMap::with_capacity(table.len());
    for (ngram, count) in table {
        *merged.entry(ngram).or_insert(0) += count;
    }
    let mut out: Vec<(T, u64)> = merged.into_iter().collect();
    sort_desc(&mut out);
    out
}
