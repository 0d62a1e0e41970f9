use super::{resolve_layout, Session};
use crate::reports;
use clap::Args;
use std::sync::Arc;
use std::time::Instant;
use strokeforge::config::Config;
use strokeforge::error::SfResult;
use strokeforge::layout::Layout;
use strokeforge::optimizer::{OptimizationOptions, Optimizer, ProgressCallback};
use strokeforge::remap::Remap;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Preset name or layout file to start from.
    #[arg(default_value = "qwerty")]
    pub layout: String,

    /// Print every Nth accepted step.
    #[arg(long, default_value_t = 1)]
    pub report_every: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    Ascent,
    Anneal,
}

struct ConsoleProgress {
    every: usize,
    start: Instant,
}

impl ProgressCallback for ConsoleProgress {
    fn on_progress(&self, step: usize, score: f64, _layout: &Layout, remap: &Remap) -> bool {
        if step % self.every == 0 {
            println!(
                "Step {:7} | {:8.3} ms | {:6.1}s | {}",
                step,
                score,
                self.start.elapsed().as_secs_f32(),
                remap
            );
        }
        true
    }
}

pub fn run(args: SearchArgs, session: Session, strategy: Strategy) -> SfResult<()> {
    let start = resolve_layout(&args.layout)?;
    let scorer = Arc::new(session.scorer_for(&start, args.config.corpus.precision)?);
    let options = OptimizationOptions::from(&args.config);
    let baseline = scorer.score(&start).score();

    reports::print_layout_grid(&start);
    println!("Starting score: {:.3} ms", baseline);

    let optimizer = Optimizer::new(scorer.clone(), Arc::new(session.constraints), options);
    let progress = ConsoleProgress {
        every: args.report_every.max(1),
        start: Instant::now(),
    };
    let result = match strategy {
        Strategy::Ascent => {
            println!("\n⛰️  Steepest ascent from '{}'", start.name);
            optimizer.run_ascent(&start, progress)?
        }
        Strategy::Anneal => {
            println!(
                "\n🔥 Annealing '{}' for {} iterations",
                start.name,
                optimizer.options().iterations
            );
            optimizer.run_anneal(&start, progress)?
        }
    };

    println!("\n=== 🏆 FINAL RESULT ===");
    println!(
        "Score: {:.3} ms ({:+.3}) after {} steps",
        result.score,
        result.score - baseline,
        result.steps
    );
    println!("Total remap: {}", result.total_remap);
    reports::print_layout_grid(&result.layout);
    reports::print_category_report("Tristrokes", &scorer.analyze(&result.layout));
    Ok(())
}
