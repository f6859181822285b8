//! Run summary table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::commands::RunOutcome;

pub fn print_summary(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!("Input: {} records read", report.records_read);
    if report.cancelled {
        println!("Run cancelled before input exhaustion");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Output"),
        header_cell("Records"),
        header_cell("File"),
    ]);
    for (tag, path) in &outcome.outputs {
        let count = report
            .counts
            .iter()
            .find(|(t, _)| t.as_str() == tag)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        table.add_row(vec![
            Cell::new(tag),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(path.display()),
        ]);
    }
    table.add_row(vec![
        Cell::new("(no output)"),
        Cell::new(report.no_output).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    println!("{table}");
    println!(
        "Routed {} of {} records in {:.2}s",
        report.total_routed(),
        report.records_read,
        report.elapsed.as_secs_f64()
    );
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}
