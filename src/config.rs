use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub corpus: CorpusSettings,
}

#[derive(Args, Debug, Clone)]
pub struct SearchParams {
    /// Annealing iterations.
    #[arg(long, default_value_t = 100_000)]
    pub iterations: usize,
    /// Seed for the annealing RNG. Unseeded runs draw one from the OS.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Keys that never move.
    #[arg(long, default_value = "")]
    pub pins: String,
    /// Worker threads for steepest ascent. Zero uses every core.
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
    /// Stop after this many accepted steps. Zero means no limit.
    #[arg(long, default_value_t = 0)]
    pub max_steps: usize,
    /// Wall-clock limit in seconds. Zero means no limit.
    #[arg(long, default_value_t = 0)]
    pub max_seconds: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            seed: None,
            pins: String::new(),
            threads: 0,
            max_steps: 0,
            max_seconds: 0,
        }
    }
}

impl SearchParams {
    pub fn pinned_keys(&self) -> Vec<char> {
        self.pins.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CorpusSettings {
    /// Score only the N most frequent trigrams. Zero keeps them all.
    #[arg(long, default_value_t = 0)]
    pub precision: usize,
}
