//! Terminal summary rendering for batch runs.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use dmm_model::{BatchReport, UnitOutcome};

/// Print the per-row batch outcome table and the totals line.
pub fn print_batch_summary(report: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Artifact", "Outcome", "Message"]);
    apply_table_style(&mut table);
    for result in &report.results {
        let outcome = match result.outcome {
            UnitOutcome::Written => "written",
            UnitOutcome::Skipped => "skipped",
            UnitOutcome::Failed => "FAILED",
        };
        table.add_row(vec![
            result.row.to_string(),
            result.name.clone().unwrap_or_default(),
            outcome.to_string(),
            result.message.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    println!(
        "{} written, {} skipped, {} failed",
        report.written_count(),
        report.skipped_count(),
        report.failed_count()
    );
}

/// Consistent table styling for all terminal tables.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}
