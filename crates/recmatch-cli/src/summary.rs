use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use recmatch_engine::{CandidateScore, ColumnContribution, ColumnProfile, MatchOutcome};
use recmatch_model::{MatchStatus, RunSummary};

pub fn print_run_summary(outcome: &MatchOutcome, output: &Path, summary_json: Option<&Path>) {
    println!("Output: {}", output.display());
    if let Some(path) = summary_json {
        println!("Summary: {}", path.display());
    }
    let summary = &outcome.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (status, count) in [
        (MatchStatus::Matched, summary.optimal),
        (MatchStatus::Review, summary.review),
        (MatchStatus::Ambiguous, summary.ambiguous),
        (MatchStatus::Unmatched, summary.unmatched),
    ] {
        table.add_row(vec![
            status_cell(status),
            count_cell(count, status_color(status)),
            dim_cell(share(count, summary.total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
        Cell::new(resolved_share(summary)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Scores: average {}, highest {}, lowest {} (optimal threshold {:.2})",
        score_text(summary, summary.average_score),
        score_text(summary, summary.highest_score),
        score_text(summary, summary.lowest_score),
        outcome.optimal_threshold
    );

    if outcome.weights.is_empty() {
        return;
    }
    let mut weights = Table::new();
    weights.set_header(vec![header_cell("Column"), header_cell("Weight")]);
    apply_table_style(&mut weights);
    align_column(&mut weights, 1, CellAlignment::Right);
    for (column, weight) in &outcome.weights {
        weights.add_row(vec![Cell::new(column), Cell::new(format!("{weight:.3}"))]);
    }
    println!("{weights}");
}

pub fn print_explain(row: usize, candidates: &[CandidateScore]) {
    println!("Destination row: {row}");
    if candidates.is_empty() {
        println!("No candidates.");
        return;
    }
    let mut header = vec![header_cell("Source row"), header_cell("Score")];
    header.extend(
        candidates[0]
            .explanation
            .iter()
            .map(|contribution| header_cell(&contribution.column)),
    );
    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for candidate in candidates {
        let mut cells = vec![
            Cell::new(candidate.source_row),
            Cell::new(format!("{:.2}", candidate.score)).add_attribute(Attribute::Bold),
        ];
        cells.extend(candidate.explanation.iter().map(contribution_cell));
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn print_profile(path: &Path, rows: usize, profiles: &[ColumnProfile]) {
    println!("Dataset: {} ({rows} rows)", path.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Uniqueness"),
        header_cell("Blanks"),
        header_cell("Duplicates"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for profile in profiles {
        table.add_row(vec![
            Cell::new(&profile.column),
            Cell::new(format!("{:.3}", profile.uniqueness)),
            count_cell(profile.blanks, Color::Yellow),
            count_cell(profile.duplicates, Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn print_groups(column: &str, groups: &[(String, f64)]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell(column), header_cell("Share")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (value, percent) in groups {
        let value_cell = if value.trim().is_empty() {
            dim_cell("(blank)")
        } else {
            Cell::new(value)
        };
        table.add_row(vec![value_cell, Cell::new(format!("{percent:.1}%"))]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn share(count: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", count as f64 / total as f64 * 100.0)
    }
}

fn resolved_share(summary: &RunSummary) -> String {
    if summary.total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", summary.resolved_ratio() * 100.0)
    }
}

fn score_text(summary: &RunSummary, score: f64) -> String {
    if summary.scored == 0 {
        "-".to_string()
    } else {
        format!("{score:.2}")
    }
}

fn status_color(status: MatchStatus) -> Color {
    match status {
        MatchStatus::Matched => Color::Green,
        MatchStatus::Review => Color::Yellow,
        MatchStatus::Ambiguous => Color::Magenta,
        MatchStatus::Unmatched => Color::Red,
    }
}

fn status_cell(status: MatchStatus) -> Cell {
    Cell::new(status.as_str()).fg(status_color(status))
}

fn contribution_cell(contribution: &ColumnContribution) -> Cell {
    let percent = contribution.similarity * 100.0;
    if contribution.pruned {
        dim_cell(format!("{percent:.0}% (pruned)"))
    } else {
        Cell::new(format!("{percent:.0}% x {:.2}", contribution.weight))
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
