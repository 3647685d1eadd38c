//! Per-category harvesting session.
//!
//! A session runs a bounded number of cycles against one category page.
//! Cycle 1 navigates to the category URL; later cycles reload it, which tends
//! to surface a different slice of the catalog. Each cycle expands the page,
//! extracts whatever it shows, and merges into the store right away, so a
//! later failure loses at most the cycle in flight.

use harvest_core::CategoryTarget;
use reqwest::Url;

use crate::cards::CardDecoder;
use crate::error::HarvestError;
use crate::expansion::{ExpansionConfig, ExpansionEnd, ExpansionMachine};
use crate::normalize::extract_items;
use crate::pacing::{Pacer, PacingConfig};
use crate::ports::{CredentialStore, DiagnosticsSink};
use crate::provider::PageProvider;
use crate::store::JsonStore;

/// Cycles per session unless configured otherwise.
pub const DEFAULT_MAX_CYCLES: u32 = 5;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_cycles: u32,
    /// Base for product links that are not absolute.
    pub site_origin: Url,
    pub expansion: ExpansionConfig,
    pub pacing: PacingConfig,
}

impl SessionConfig {
    #[must_use]
    pub fn new(site_origin: Url) -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            site_origin,
            expansion: ExpansionConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u32,
    pub end: ExpansionEnd,
    pub expansions: u32,
    pub extracted: usize,
    pub skipped: usize,
    pub added: usize,
    pub total: usize,
}

#[derive(Debug)]
pub enum SessionStatus {
    Completed,
    /// A failure outside the expansion loop aborted the remaining cycles.
    Failed(HarvestError),
}

#[derive(Debug)]
pub struct SessionReport {
    pub category: String,
    pub cycles: Vec<CycleReport>,
    /// Items appended across all cycles.
    pub added: usize,
    /// Items in the store after the last successful merge.
    pub total: usize,
    pub status: SessionStatus,
}

impl SessionReport {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            cycles: Vec::new(),
            added: 0,
            total: 0,
            status: SessionStatus::Completed,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.status, SessionStatus::Completed)
    }
}

pub struct SessionOrchestrator<'a> {
    config: &'a SessionConfig,
    decoder: &'a CardDecoder,
    store: &'a JsonStore,
    credentials: &'a dyn CredentialStore,
    diagnostics: &'a dyn DiagnosticsSink,
}

impl<'a> SessionOrchestrator<'a> {
    #[must_use]
    pub fn new(
        config: &'a SessionConfig,
        decoder: &'a CardDecoder,
        store: &'a JsonStore,
        credentials: &'a dyn CredentialStore,
        diagnostics: &'a dyn DiagnosticsSink,
    ) -> Self {
        Self {
            config,
            decoder,
            store,
            credentials,
            diagnostics,
        }
    }

    /// Runs every cycle for `target`. Never fails: a critical failure is
    /// recorded in [`SessionReport::status`] after diagnostics are captured
    /// and credentials persisted.
    pub async fn run<P>(
        &self,
        provider: &mut P,
        target: &CategoryTarget,
        pacer: &mut Pacer,
    ) -> SessionReport
    where
        P: PageProvider + ?Sized,
    {
        let category = target.name.as_str();
        let mut report = SessionReport::new(category);

        self.restore_credentials(provider, category).await;

        if let Err(e) = self.run_cycles(provider, target, pacer, &mut report).await {
            tracing::error!(
                category,
                completed_cycles = report.cycles.len(),
                error = %e,
                "session aborted"
            );
            self.capture(provider, category, "error").await;
            report.status = SessionStatus::Failed(e);
        }

        self.capture(provider, category, "final").await;
        self.persist_credentials(provider, category).await;

        tracing::info!(
            category,
            added = report.added,
            total = report.total,
            succeeded = report.succeeded(),
            "session finished"
        );
        report
    }

    async fn run_cycles<P>(
        &self,
        provider: &mut P,
        target: &CategoryTarget,
        pacer: &mut Pacer,
        report: &mut SessionReport,
    ) -> Result<(), HarvestError>
    where
        P: PageProvider + ?Sized,
    {
        let category = target.name.as_str();
        let max_cycles = self.config.max_cycles;

        for cycle in 1..=max_cycles {
            tracing::info!(category, cycle, max_cycles, "starting cycle");
            if cycle == 1 {
                provider.navigate(&target.url).await?;
            } else {
                provider.reload().await?;
            }
            pacer.load_wait().await;

            let outcome = ExpansionMachine::new(category, self.config.expansion, pacer)
                .run(provider)
                .await;

            let snapshot = provider.snapshot().await?;
            let batch = extract_items(self.decoder.decode(&snapshot), &self.config.site_origin);
            let extracted = batch.items.len();
            let merged = self.store.merge(category, batch.items)?;

            tracing::info!(
                category,
                cycle,
                end = outcome.end.label(),
                expansions = outcome.expansions,
                extracted,
                skipped = batch.skipped,
                added = merged.added,
                total = merged.total,
                "cycle complete"
            );

            report.added += merged.added;
            report.total = merged.total;
            report.cycles.push(CycleReport {
                cycle,
                end: outcome.end,
                expansions: outcome.expansions,
                extracted,
                skipped: batch.skipped,
                added: merged.added,
                total: merged.total,
            });
        }

        Ok(())
    }

    async fn restore_credentials<P>(&self, provider: &mut P, category: &str)
    where
        P: PageProvider + ?Sized,
    {
        let blob = match self.credentials.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!(category, "no stored credentials; starting a fresh session");
                return;
            }
            Err(e) => {
                tracing::warn!(category, error = %e, "failed to load credentials");
                return;
            }
        };
        if let Err(e) = provider.apply_credentials(&blob).await {
            tracing::warn!(category, error = %e, "failed to apply credentials");
        }
    }

    async fn persist_credentials<P>(&self, provider: &mut P, category: &str)
    where
        P: PageProvider + ?Sized,
    {
        match provider.export_credentials().await {
            Ok(Some(blob)) => {
                if let Err(e) = self.credentials.save(&blob) {
                    tracing::warn!(category, error = %e, "failed to save credentials");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(category, error = %e, "failed to export credentials"),
        }
    }

    /// Best-effort diagnostic capture; failures are logged only.
    async fn capture<P>(&self, provider: &mut P, category: &str, label: &str)
    where
        P: PageProvider + ?Sized,
    {
        match provider.capture_diagnostics().await {
            Ok(Some(bytes)) => match self.diagnostics.record(category, label, &bytes) {
                Ok(path) => tracing::debug!(category, label, path = %path.display(), "diagnostics saved"),
                Err(e) => tracing::warn!(category, label, error = %e, "failed to save diagnostics"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(category, label, error = %e, "diagnostic capture failed"),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
