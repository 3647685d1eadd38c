//! `reconcile` command handler.

use std::path::Path;

use harvest_scraper::{load_and_resolve, write_report, ConflictReport, JsonStore};

/// Resolves the stores under `data_dir` for `categories` (in that order),
/// writes the report to `output`, and prints per-category counts.
///
/// # Errors
///
/// Returns an error if fewer than two categories are configured or the
/// report cannot be written.
pub(crate) fn run_reconcile(
    data_dir: &Path,
    categories: &[String],
    output: &Path,
) -> anyhow::Result<ConflictReport> {
    let store = JsonStore::new(data_dir);
    let report = load_and_resolve(&store, categories)?;
    write_report(output, &report)?;

    tracing::info!(
        output = %output.display(),
        conflicts = report.conflicts.len(),
        "reconciliation complete"
    );

    println!("Scan complete. Report written to {}", output.display());
    for (category, items) in &report.unique {
        println!("{category} unique: {}", items.len());
    }
    println!("conflicts: {}", report.conflicts.len());

    Ok(report)
}
