use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ukb_cli::report::{TableOutcome, TableStatus};

use crate::types::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("Output: {}", summary.output_dir.display());
    match &summary.mapping_file {
        Some(path) => println!(
            "Field mapping: {} ({} records)",
            path.display(),
            summary.mapping_records
        ),
        None => println!("Field mapping: none"),
    }
    if summary.plan_only {
        print_plan(summary);
        return;
    }
    if let Some(path) = &summary.merged_file {
        println!("Merged table: {}", path.display());
    }
    if let Some(path) = &summary.report_file {
        println!("Run report: {}", path.display());
    }

    let report = &summary.report;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Status"),
        header_cell("Fields"),
        header_cell("Unresolved"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Renamed"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 1, CellAlignment::Center);
    for outcome in &report.outcomes {
        table.add_row(outcome_row(outcome));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{}/{}", report.merged_tables(), report.outcomes.len()))
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(report.unmatched.len(), Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(report.merged_rows).add_attribute(Attribute::Bold),
        Cell::new(report.merged_columns).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_unmatched(summary);

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        eprintln!("Skipped tables:");
        for failure in failures {
            eprintln!("- {failure}");
        }
    }
}

fn print_plan(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Fields")]);
    apply_summary_table_style(&mut table);
    for planned in summary.report.plan.tables() {
        table.add_row(vec![
            Cell::new(&planned.table_path),
            Cell::new(planned.identifiers.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_unmatched(summary: &RunSummary) {
    let unmatched = &summary.report.unmatched;
    if unmatched.is_empty() {
        println!("All fields matched.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field ID"), header_cell("Field")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for field in unmatched {
        table.add_row(vec![
            Cell::new(&field.identifier).fg(Color::Yellow),
            Cell::new(&field.display_name),
        ]);
    }
    println!();
    println!("Unmatched fields:");
    println!("{table}");
    if let Some(path) = &summary.unmatched_file {
        println!("Unmatched list: {}", path.display());
    }
}

fn outcome_row(outcome: &TableOutcome) -> Vec<Cell> {
    let status = match &outcome.status {
        TableStatus::Merged => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        TableStatus::Skipped { failure } => {
            Cell::new(format!("skipped ({})", failure.stage)).fg(Color::Red)
        }
    };
    vec![
        Cell::new(&outcome.table)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        status,
        Cell::new(outcome.resolved.len()),
        count_cell(outcome.unresolved.len(), Color::Yellow),
        Cell::new(outcome.rows),
        Cell::new(outcome.columns),
        count_cell(outcome.renamed, Color::Yellow),
        count_cell(outcome.dropped, Color::DarkYellow),
    ]
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
