pub mod analyze;
pub mod search;

use std::str::FromStr;
use strokeforge::constraint::ConstraintMap;
use strokeforge::corpus::Corpus;
use strokeforge::error::SfResult;
use strokeforge::layout::{Layout, LayoutDefinition};
use strokeforge::layouts::KnownLayout;
use strokeforge::scorer::loader::{load_ngrams_file, load_speed_samples_file};
use strokeforge::scorer::{Scorer, ScorerBuilder, SpeedModel};
use tracing::info;

/// Data every subcommand scores against, loaded once up front.
pub struct Session {
    pub speeds: SpeedModel,
    pub corpus: Corpus,
    pub constraints: ConstraintMap,
}

impl Session {
    pub fn load(ngrams: &str, speeds: &str, constraints: Option<&str>) -> SfResult<Self> {
        println!("📂 Loading Corpus: {}", ngrams);
        let corpus = load_ngrams_file(ngrams)?;
        println!("⏱️  Loading Speeds: {}", speeds);
        let samples = load_speed_samples_file(speeds)?;
        let speeds = SpeedModel::from_samples(samples);
        info!(
            "{} samples over {} strokes",
            speeds.sample_count(),
            speeds.stroke_count()
        );
        let constraints = match constraints {
            Some(path) => {
                println!("🔒 Loading Constraints: {}", path);
                ConstraintMap::load_from_file(path)?
            }
            None => ConstraintMap::new("unconstrained"),
        };
        Ok(Self {
            speeds,
            corpus,
            constraints,
        })
    }

    pub fn scorer_for(&self, layout: &Layout, precision: usize) -> SfResult<Scorer> {
        ScorerBuilder::new()
            .with_geometry(layout.shared_geometry())
            .with_speeds(&self.speeds)
            .with_corpus(&self.corpus)
            .with_precision(precision)
            .build()
    }
}

/// A preset name, or else a path to a layout definition file.
pub fn resolve_layout(name: &str) -> SfResult<Layout> {
    match KnownLayout::from_str(&name.to_lowercase()) {
        Ok(known) => known.layout(),
        Err(_) => LayoutDefinition::load_from_file(name),
    }
}
