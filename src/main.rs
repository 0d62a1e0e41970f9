use clap::{Parser, Subcommand};
use std::process;
use strokeforge::error::SfResult;
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

use cmd::search::Strategy;
use cmd::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tab-separated n-gram counts.
    #[arg(global = true, short, long, default_value = "data/ngrams.tsv")]
    ngrams: String,

    /// Recorded tristroke timings.
    #[arg(global = true, short, long, default_value = "data/speeds.csv")]
    speeds: String,

    /// Per-position frequency caps.
    #[arg(global = true, short, long)]
    constraints: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score and break down layouts.
    Analyze(cmd::analyze::AnalyzeArgs),
    /// Steepest ascent to a local optimum.
    Ascend(cmd::search::SearchArgs),
    /// Simulated annealing for a fixed number of iterations.
    Anneal(cmd::search::SearchArgs),
}

fn init_tracing(debug: bool) {
    let default = if debug { "strokeforge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> SfResult<()> {
    println!("\n🚀 Initializing StrokeForge...");
    let session = Session::load(&cli.ngrams, &cli.speeds, cli.constraints.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => cmd::analyze::run(args, &session),
        Commands::Ascend(args) => cmd::search::run(args, session, Strategy::Ascent),
        Commands::Anneal(args) => cmd::search::run(args, session, Strategy::Anneal),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = execute(cli) {
        eprintln!("\n❌ FATAL ERROR:");
        eprintln!("   {}", e);
        process::exit(1);
    }
}
