//! `collect` command handler.
//!
//! Runs one harvesting session per selected category. A category that fails
//! is reported and skipped; the command itself fails only when every
//! category did.

mod runner;

use harvest_core::{AppConfig, CategoriesFile, CategoryTarget};
use harvest_scraper::{ExpansionConfig, PacingConfig, SessionConfig, SessionStatus};

use runner::CategoryOutcome;

/// Harvest the selected categories and print a summary line for each.
///
/// # Errors
///
/// Returns an error if `filter` names an unknown category, the card
/// selectors do not compile, or every category failed.
pub(crate) async fn run_collect(
    config: &AppConfig,
    categories: &CategoriesFile,
    filter: Option<&str>,
    cycles: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let targets = select_targets(categories, filter)?;
    let session_config = session_config(config, cycles);

    if dry_run {
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        println!(
            "dry-run: would collect {} categories ({} cycles each): [{}]",
            targets.len(),
            session_config.max_cycles,
            names.join(", ")
        );
        return Ok(());
    }

    let outcomes = runner::run_sessions(config, categories, &targets, &session_config).await?;
    for outcome in &outcomes {
        println!("{}", summary_line(outcome));
    }

    runner::ensure_any_succeeded(&outcomes)
}

/// All configured categories, or just the one named by `filter`.
fn select_targets(
    categories: &CategoriesFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<CategoryTarget>> {
    let Some(name) = filter else {
        return Ok(categories.categories.clone());
    };
    match categories.find(name) {
        Some(target) => Ok(vec![target.clone()]),
        None => anyhow::bail!(
            "unknown category '{name}'; configured categories: {}",
            categories.names().join(", ")
        ),
    }
}

fn session_config(config: &AppConfig, cycles: Option<u32>) -> SessionConfig {
    SessionConfig {
        max_cycles: cycles.unwrap_or(config.max_cycles),
        site_origin: config.site_origin.clone(),
        expansion: ExpansionConfig {
            max_expansions: config.max_expansions,
            ..ExpansionConfig::default()
        },
        pacing: PacingConfig {
            load_wait_ms: config.load_wait_ms,
            expand_dwell_ms: config.expand_dwell_ms,
            ..PacingConfig::default()
        },
    }
}

fn summary_line(outcome: &CategoryOutcome) -> String {
    match outcome {
        CategoryOutcome::Finished(report) => match &report.status {
            SessionStatus::Completed => format!(
                "[{}] added {} new unique items; total in file: {}",
                report.category, report.added, report.total
            ),
            SessionStatus::Failed(e) => format!(
                "[{}] failed after {} cycles: {e}; added {} new unique items; total in file: {}",
                report.category,
                report.cycles.len(),
                report.added,
                report.total
            ),
        },
        CategoryOutcome::Err { category, error } => format!("[{category}] failed: {error:#}"),
    }
}

#[cfg(test)]
#[path = "collect/collect_test.rs"]
mod tests;
