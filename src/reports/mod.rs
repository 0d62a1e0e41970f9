use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use strokeforge::layout::Layout;
use strokeforge::scorer::{Category, CategoryReport, FingerStats, ScoreStats};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn print_layout_grid(layout: &Layout) {
    println!("\nLayout: {}", layout.name);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for row in layout.rows() {
        let cells: Vec<Cell> = row
            .chars()
            .map(|c| Cell::new(c.to_string()).set_alignment(CellAlignment::Center))
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_category_report(title: &str, report: &CategoryReport) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new("Freq"),
        Cell::new("Known"),
        Cell::new("Speed (ms)"),
        Cell::new("Contrib (ms)").fg(Color::Cyan),
    ]);
    align_right(&mut table, 1, 4);

    for row in &report.rows {
        if row.raw.count == 0 && row.category != Category::Total {
            continue;
        }
        let name = Cell::new(row.category.display_name());
        let name = if row.category.is_leaf() {
            name
        } else {
            name.add_attribute(Attribute::Bold)
        };
        let s = row.stats;
        table.add_row(vec![
            name,
            Cell::new(pct(s.freq_prop)),
            Cell::new(pct(s.known_prop)),
            Cell::new(format!("{:.1}", s.speed)),
            Cell::new(format!("{:.2}", s.contribution)).fg(Color::Cyan),
        ]);
    }
    println!("\n{}", table);
    if report.unmeasured > 0 {
        println!(
            "⚠️  {} occurrences had no speed data in any related category.",
            report.unmeasured
        );
    }
}

pub fn print_finger_report(fingers: &[FingerStats]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Finger").add_attribute(Attribute::Bold),
        Cell::new("Keys"),
        Cell::new("Trigrams"),
        Cell::new("Known"),
        Cell::new("Mean (ms)"),
        Cell::new("Contrib (ms)").fg(Color::Cyan),
    ]);
    align_right(&mut table, 1, 5);

    for f in fingers.iter().filter(|f| f.trigram_freq > 0.0 || f.key_freq > 0.0) {
        table.add_row(vec![
            Cell::new(&f.label).add_attribute(Attribute::Bold),
            Cell::new(pct(f.key_freq)),
            Cell::new(pct(f.trigram_freq)),
            Cell::new(pct(f.known_prop)),
            Cell::new(format!("{:.1}", f.mean_ms)),
            Cell::new(format!("{:.2}", f.contribution)).fg(Color::Cyan),
        ]);
    }
    println!("\n{}", table);
}

/// Ranks layouts by mean trigram time, best first.
pub fn print_comparison_report(results: &[(String, ScoreStats)]) {
    let Some(best) = results
        .iter()
        .min_by(|a, b| a.1.score().total_cmp(&b.1.score()))
    else {
        return;
    };
    let best_score = best.1.score();

    let mut table = new_table();
    table.add_row(vec![
        Cell::new(format!("Comparison vs Best ({})", best.0)).add_attribute(Attribute::Bold),
        Cell::new("Mean (ms)"),
        Cell::new("Delta"),
        Cell::new("% Diff"),
        Cell::new("Known"),
    ]);
    align_right(&mut table, 1, 4);

    let mut sorted: Vec<&(String, ScoreStats)> = results.iter().collect();
    sorted.sort_by(|a, b| a.1.score().total_cmp(&b.1.score()));
    for (name, stats) in sorted {
        let score = stats.score();
        let delta = score - best_score;
        let diff = if best_score > 0.0 {
            delta / best_score * 100.0
        } else {
            0.0
        };
        let name_cell = if name == &best.0 {
            Cell::new(name)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(name).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            name_cell,
            Cell::new(format!("{:.2}", score)),
            Cell::new(format!("{:+.2}", delta)),
            Cell::new(format!("{:.1}%", diff)),
            Cell::new(pct(stats.known_prop())),
        ]);
    }
    println!("\n{}", table);
}
