use crate::scorer::category::{Category, Taxonomy};
use crate::scorer::flow::StrokeClassifier;
use crate::scorer::stroke::{Bistroke, StrokeShape, Tristroke};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// One timed tristroke: the time from the first press to the second, and
/// from the second to the third.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSample {
    pub stroke: Tristroke,
    pub first_ms: f64,
    pub second_ms: f64,
    pub note: Option<String>,
}

impl SpeedSample {
    pub fn new(stroke: Tristroke, first_ms: f64, second_ms: f64) -> Self {
        Self {
            stroke,
            first_ms,
            second_ms,
            note: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Medians {
    pub first: f64,
    pub second: f64,
    pub total: f64,
}

/// `exact` is set only when the stroke itself (or a compatible one) has
/// samples. `has_data` is false when nothing in the category hierarchy had
/// data and `ms` is a placeholder zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEstimate {
    pub ms: f64,
    pub exact: bool,
    pub has_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorySpeed {
    pub ms: f64,
    /// Number of distinct strokes the mean was taken over.
    pub strokes: usize,
    /// True when the value was taken from a related category.
    pub borrowed: bool,
    pub has_data: bool,
}

impl CategorySpeed {
    const NO_DATA: CategorySpeed = CategorySpeed {
        ms: 0.0,
        strokes: 0,
        borrowed: true,
        has_data: false,
    };
}

/// Median as taken by most statistics packages: the mean of the middle
/// two values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[derive(Debug, Clone)]
struct StrokeClass {
    representative: Tristroke,
    firsts: Vec<f64>,
    seconds: Vec<f64>,
    totals: Vec<f64>,
}

#[derive(Debug, Default)]
struct Derived {
    tristroke_speeds: HashMap<Category, CategorySpeed>,
    bistroke_medians: HashMap<StrokeShape<2>, f64>,
    bistroke_speeds: HashMap<Category, CategorySpeed>,
}

/// Empirical timing data.
///
/// Samples are filed under the shape of their stroke, which merges every
/// compatible stroke into one class. Medians are computed on first use and
/// cached per class; category tables are rebuilt lazily after new samples
/// arrive.
#[derive(Debug, Default)]
pub struct SpeedModel {
    classifier: StrokeClassifier,
    classes: HashMap<StrokeShape<3>, StrokeClass>,
    sample_count: usize,
    medians: RwLock<HashMap<StrokeShape<3>, Medians>>,
    derived: RwLock<Option<Arc<Derived>>>,
}

impl SpeedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples<I: IntoIterator<Item = SpeedSample>>(samples: I) -> Self {
        let mut model = Self::new();
        for sample in samples {
            model.record(sample);
        }
        model
    }

    pub fn record(&mut self, sample: SpeedSample) {
        let shape = sample.stroke.shape();
        let class = self.classes.entry(shape).or_insert_with(|| StrokeClass {
            representative: sample.stroke,
            firsts: Vec::new(),
            seconds: Vec::new(),
            totals: Vec::new(),
        });
        class.firsts.push(sample.first_ms);
        class.seconds.push(sample.second_ms);
        class.totals.push(sample.first_ms + sample.second_ms);
        self.sample_count += 1;

        self.medians
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&shape);
        *self.derived.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Number of distinct (mutually incompatible) strokes with samples.
    pub fn stroke_count(&self) -> usize {
        self.classes.len()
    }

    pub fn classifier(&self) -> &StrokeClassifier {
        &self.classifier
    }

    pub fn median(&self, stroke: &Tristroke) -> Option<Medians> {
        self.median_of(&stroke.shape())
    }

    fn median_of(&self, shape: &StrokeShape<3>) -> Option<Medians> {
        if let Some(m) = self
            .medians
            .read()
            .ok()
            .and_then(|cache| cache.get(shape).copied())
        {
            return Some(m);
        }

        let class = self.classes.get(shape)?;
        let m = Medians {
            first: median(&class.firsts)?,
            second: median(&class.seconds)?,
            total: median(&class.totals)?,
        };
        if let Ok(mut cache) = self.medians.write() {
            cache.insert(*shape, m);
        }
        Some(m)
    }

    fn derived(&self) -> Arc<Derived> {
        if let Some(d) = self.derived.read().ok().and_then(|d| d.clone()) {
            return d;
        }
        let built = Arc::new(self.build_derived());
        if let Ok(mut slot) = self.derived.write() {
            *slot = Some(built.clone());
        }
        built
    }

    fn build_derived(&self) -> Derived {
        let mut tri_sums: HashMap<Category, (f64, usize)> = HashMap::new();
        let mut bi_samples: HashMap<StrokeShape<2>, (Bistroke, f64, usize)> = HashMap::new();

        for (shape, class) in &self.classes {
            let stroke = &class.representative;
            if stroke.has_unknown() {
                continue;
            }
            let Some(m) = self.median_of(shape) else {
                continue;
            };

            let entry = tri_sums
                .entry(self.classifier.tristroke(stroke))
                .or_insert((0.0, 0));
            entry.0 += m.total;
            entry.1 += 1;

            for (i, j, ms) in [(0, 1, m.first), (1, 2, m.second)] {
                let bistroke = stroke.bistroke(i, j);
                let e = bi_samples
                    .entry(bistroke.shape())
                    .or_insert((bistroke, 0.0, 0));
                e.1 += ms;
                e.2 += 1;
            }
        }

        let mut bistroke_medians = HashMap::with_capacity(bi_samples.len());
        let mut bi_sums: HashMap<Category, (f64, usize)> = HashMap::new();
        for (shape, (stroke, sum, n)) in bi_samples {
            let ms = sum / n as f64;
            bistroke_medians.insert(shape, ms);
            let entry = bi_sums
                .entry(self.classifier.bistroke(&stroke))
                .or_insert((0.0, 0));
            entry.0 += ms;
            entry.1 += 1;
        }

        let derived = Derived {
            tristroke_speeds: fill_category_speeds(Taxonomy::Tristroke, &tri_sums),
            bistroke_medians,
            bistroke_speeds: fill_category_speeds(Taxonomy::Bistroke, &bi_sums),
        };
        debug!(
            "Speed tables rebuilt: {} strokes, {} bistrokes",
            self.classes.len(),
            derived.bistroke_medians.len()
        );
        derived
    }

    /// Mean tristroke speed of a category, rolled up through the hierarchy
    /// when the category has no data of its own.
    pub fn category_fallback(&self, category: Category) -> CategorySpeed {
        self.category_speed(Taxonomy::Tristroke, category)
    }

    pub fn category_speed(&self, taxonomy: Taxonomy, category: Category) -> CategorySpeed {
        let derived = self.derived();
        let table = match taxonomy {
            Taxonomy::Tristroke => &derived.tristroke_speeds,
            Taxonomy::Bistroke => &derived.bistroke_speeds,
        };
        table
            .get(&category)
            .copied()
            .unwrap_or(CategorySpeed::NO_DATA)
    }

    /// Speed table for every category of a taxonomy, in taxonomy order.
    pub fn category_table(&self, taxonomy: Taxonomy) -> Vec<(Category, CategorySpeed)> {
        taxonomy
            .categories()
            .iter()
            .map(|c| (*c, self.category_speed(taxonomy, *c)))
            .collect()
    }

    pub fn estimate(&self, stroke: &Tristroke) -> SpeedEstimate {
        if !stroke.has_unknown() {
            if let Some(m) = self.median(stroke) {
                return SpeedEstimate {
                    ms: m.total,
                    exact: true,
                    has_data: true,
                };
            }
        }
        let fallback = self.category_fallback(self.classifier.tristroke(stroke));
        SpeedEstimate {
            ms: fallback.ms,
            exact: false,
            has_data: fallback.has_data,
        }
    }

    /// Bistroke speeds come from the sub-bigram medians of every recorded
    /// tristroke containing that bistroke.
    pub fn bistroke_estimate(&self, stroke: &Bistroke) -> SpeedEstimate {
        let derived = self.derived();
        if !stroke.has_unknown() {
            if let Some(ms) = derived.bistroke_medians.get(&stroke.shape()) {
                return SpeedEstimate {
                    ms: *ms,
                    exact: true,
                    has_data: true,
                };
            }
        }
        let fallback = derived
            .bistroke_speeds
            .get(&self.classifier.bistroke(stroke))
            .copied()
            .unwrap_or(CategorySpeed::NO_DATA);
        SpeedEstimate {
            ms: fallback.ms,
            exact: false,
            has_data: fallback.has_data,
        }
    }
}

/// Fills the speed of every category in `taxonomy` from per-leaf sums.
///
/// A category with data of its own (directly, or through any member leaf)
/// uses the mean over those strokes. An empty leaf next tries the leaves
/// whose tags extend its own. Otherwise suffix aggregates average
/// their filled members, and everything else walks up
/// [`Category::fallback_parent`] until some ancestor has data.
fn fill_category_speeds(
    taxonomy: Taxonomy,
    leaf_sums: &HashMap<Category, (f64, usize)>,
) -> HashMap<Category, CategorySpeed> {
    let mean_over = |leaves: &mut dyn Iterator<Item = Category>, borrowed: bool| {
        let (sum, n) = leaves
            .filter_map(|leaf| leaf_sums.get(&leaf))
            .fold((0.0, 0), |(s, n), (ls, ln)| (s + ls, n + ln));
        (n > 0).then(|| CategorySpeed {
            ms: sum / n as f64,
            strokes: n,
            borrowed,
            has_data: true,
        })
    };
    // an empty leaf takes the strokes of the leaves extending its tag
    let direct = |cat: Category| -> Option<CategorySpeed> {
        mean_over(&mut cat.members(taxonomy), false)
            .or_else(|| mean_over(&mut cat.subcategories(taxonomy), true))
    };

    let fallback = |cat: Category| -> CategorySpeed {
        let mut current = cat.fallback_parent();
        while let Some(parent) = current {
            if let Some(found) = direct(parent) {
                return CategorySpeed {
                    borrowed: true,
                    ..found
                };
            }
            current = parent.fallback_parent();
        }
        CategorySpeed::NO_DATA
    };

    let mut table = HashMap::new();
    for &cat in taxonomy.categories() {
        if cat.is_suffix_aggregate() {
            continue;
        }
        table.insert(cat, direct(cat).unwrap_or_else(|| fallback(cat)));
    }

    for &cat in taxonomy.categories() {
        if !cat.is_suffix_aggregate() {
            continue;
        }
        let speed = direct(cat).unwrap_or_else(|| {
            let filled: Vec<f64> = cat
                .members(taxonomy)
                .filter_map(|leaf| table.get(&leaf))
                .filter(|s| s.has_data)
                .map(|s| s.ms)
                .collect();
            if filled.is_empty() {
                fallback(cat)
            } else {
                CategorySpeed {
                    ms: filled.iter().sum::<f64>() / filled.len() as f64,
                    strokes: 0,
                    borrowed: true,
                    has_data: true,
                }
            }
        });
        table.insert(cat, speed);
    }

    table
}
