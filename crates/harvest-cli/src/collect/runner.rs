//! Concurrent per-category session runs.

use futures::stream::{self, StreamExt};
use harvest_core::{AppConfig, CategoriesFile, CategoryTarget};
use harvest_scraper::{
    CardDecoder, FileCredentialStore, FileDiagnosticsSink, JsonStore, Pacer, SessionConfig,
    SessionOrchestrator, SessionReport, StaticPageProvider,
};

/// Result of one category: a session report (which may itself record a
/// critical failure), or an error that kept the session from starting.
pub(super) enum CategoryOutcome {
    Finished(SessionReport),
    Err {
        category: String,
        error: anyhow::Error,
    },
}

impl CategoryOutcome {
    pub(super) fn category(&self) -> &str {
        match self {
            CategoryOutcome::Finished(report) => &report.category,
            CategoryOutcome::Err { category, .. } => category,
        }
    }

    pub(super) fn succeeded(&self) -> bool {
        matches!(self, CategoryOutcome::Finished(report) if report.succeeded())
    }
}

/// Runs a session for every target, at most
/// `config.max_concurrent_categories` at a time. Outcomes come back in
/// target order.
pub(super) async fn run_sessions(
    config: &AppConfig,
    categories: &CategoriesFile,
    targets: &[CategoryTarget],
    session_config: &SessionConfig,
) -> anyhow::Result<Vec<CategoryOutcome>> {
    let decoder = CardDecoder::new(&categories.selectors)?;
    let store = JsonStore::new(config.data_dir.clone());
    let credentials = FileCredentialStore::new(config.cookies_path.clone());
    let diagnostics = FileDiagnosticsSink::new(config.diagnostics_dir.clone());
    let orchestrator =
        SessionOrchestrator::new(session_config, &decoder, &store, &credentials, &diagnostics);

    let max_concurrent = config.max_concurrent_categories.max(1);
    let terminal_text = categories.markers.terminal_text.as_str();

    let mut results: Vec<(usize, CategoryOutcome)> = stream::iter(targets.iter().enumerate())
        .map(|(idx, target)| {
            let orchestrator = &orchestrator;
            async move {
                let outcome =
                    run_category(orchestrator, config, session_config, terminal_text, target)
                        .await;
                (idx, outcome)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);
    Ok(results.into_iter().map(|(_, outcome)| outcome).collect())
}

async fn run_category(
    orchestrator: &SessionOrchestrator<'_>,
    config: &AppConfig,
    session_config: &SessionConfig,
    terminal_text: &str,
    target: &CategoryTarget,
) -> CategoryOutcome {
    let provider =
        StaticPageProvider::new(config.request_timeout_secs, &config.user_agent, terminal_text);
    let mut provider = match provider {
        Ok(p) => p.with_retries(config.max_retries, config.backoff_base_secs),
        Err(e) => {
            return CategoryOutcome::Err {
                category: target.name.clone(),
                error: anyhow::Error::new(e).context("failed to build page provider"),
            }
        }
    };

    let mut pacer = Pacer::new(session_config.pacing.clone());
    CategoryOutcome::Finished(orchestrator.run(&mut provider, target, &mut pacer).await)
}

/// Logs failed categories and errors out only when none succeeded.
///
/// # Errors
///
/// Returns an error if every outcome is a failure.
pub(super) fn ensure_any_succeeded(outcomes: &[CategoryOutcome]) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for outcome in outcomes {
        if let CategoryOutcome::Err { category, error } = outcome {
            tracing::error!(category = %category, error = %error, "category could not be collected");
        }
        if !outcome.succeeded() {
            failed += 1;
        }
    }

    if failed > 0 {
        tracing::warn!(
            failed_categories = failed,
            total_categories = outcomes.len(),
            "some categories failed during collection"
        );
    }

    if !outcomes.is_empty() && failed == outcomes.len() {
        let failed_names: Vec<&str> = outcomes.iter().map(CategoryOutcome::category).collect();
        anyhow::bail!(
            "all {failed} categories failed collection: {}",
            failed_names.join(", ")
        );
    }

    Ok(())
}
