use super::{resolve_layout, Session};
use crate::reports;
use clap::Args;
use strokeforge::config::CorpusSettings;
use strokeforge::error::SfResult;
use strokeforge::layouts::all_layouts;
use strokeforge::scorer::Scorer;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub corpus: CorpusSettings,

    /// Preset names or layout files. Every preset when empty.
    pub layouts: Vec<String>,

    /// Print category and finger breakdowns for every layout.
    #[arg(short, long, default_value_t = false)]
    pub detail: bool,
}

pub fn run(args: AnalyzeArgs, session: &Session) -> SfResult<()> {
    let layouts = if args.layouts.is_empty() {
        all_layouts()?
    } else {
        args.layouts
            .iter()
            .map(|name| resolve_layout(name))
            .collect::<SfResult<Vec<_>>>()?
    };

    println!("\n🔎 === LAYOUT ANALYSIS === 🔎");
    let mut results = Vec::new();
    let mut scorer: Option<Scorer> = None;
    for layout in &layouts {
        // presets share one board, so the tables are built once
        let reuse = matches!(&scorer, Some(s) if s.check_layout(layout).is_ok());
        if !reuse {
            scorer = Some(session.scorer_for(layout, args.corpus.precision)?);
        }
        let Some(scorer) = scorer.as_ref() else {
            continue;
        };

        let stats = scorer.score(layout);
        let legal = session
            .constraints
            .is_layout_legal(layout, &scorer.key_frequencies(layout));
        if !legal {
            println!("⚠️  '{}' breaks constraint map '{}'", layout.name, session.constraints.name);
        }
        if args.detail {
            reports::print_layout_grid(layout);
            reports::print_category_report("Tristrokes", &scorer.analyze(layout));
            reports::print_category_report("Bistrokes", &scorer.analyze_bistrokes(layout));
            reports::print_finger_report(&scorer.analyze_fingers(layout));
        }
        results.push((layout.name.clone(), stats));
    }

    reports::print_comparison_report(&results);
    Ok(())
}
