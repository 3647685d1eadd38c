use std::path::PathBuf;
use std::sync::Mutex;

use harvest_core::CardSelectors;

use super::*;
use crate::error::{PortError, ProviderError};
use crate::ports::FileCredentialStore;
use crate::testing::{FailPoint, FakePage};

/// Remembers the labels it was asked to record.
#[derive(Default)]
struct RecordingSink {
    labels: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, category: &str, label: &str, _capture: &[u8]) -> Result<PathBuf, PortError> {
        self.labels.lock().unwrap().push(label.to_owned());
        Ok(PathBuf::from(format!("{category}_{label}.png")))
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    config: SessionConfig,
    decoder: CardDecoder,
    store: JsonStore,
    credentials: FileCredentialStore,
    diagnostics: RecordingSink,
}

impl Harness {
    fn new(max_cycles: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SessionConfig::new(Url::parse("https://shop.example.com").unwrap());
        config.max_cycles = max_cycles;
        config.pacing = PacingConfig::instant();
        Self {
            store: JsonStore::new(dir.path().join("data")),
            credentials: FileCredentialStore::new(dir.path().join("cookies_raw.json")),
            decoder: CardDecoder::new(&CardSelectors::default()).unwrap(),
            diagnostics: RecordingSink::default(),
            config,
            _dir: dir,
        }
    }

    async fn run(&self, page: &mut FakePage) -> SessionReport {
        let orchestrator = SessionOrchestrator::new(
            &self.config,
            &self.decoder,
            &self.store,
            &self.credentials,
            &self.diagnostics,
        );
        let target = CategoryTarget::new("electronics", "https://shop.example.com/c/phones");
        let mut pacer = Pacer::seeded(self.config.pacing.clone(), 17);
        orchestrator.run(page, &target, &mut pacer).await
    }

    fn stored_names(&self) -> Vec<String> {
        self.store
            .load("electronics")
            .items
            .into_iter()
            .map(|i| i.name)
            .collect()
    }
}

fn listing(names: &[&str]) -> String {
    let cards: String = names
        .iter()
        .map(|n| {
            format!(
                r#"<div class="w-full cursor-pointer"><a href="/p/{n}"><h3>{n}</h3></a></div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

#[tokio::test]
async fn navigates_once_then_reloads_each_cycle() {
    let harness = Harness::new(3);
    let mut page = FakePage::new().with_pages(vec![listing(&["A"])]);
    let report = harness.run(&mut page).await;

    assert!(report.succeeded());
    assert_eq!(report.cycles.len(), 3);
    assert_eq!(page.loads, 3);
    assert_eq!(page.reloads, 2);
}

#[tokio::test]
async fn merges_after_every_cycle_and_deduplicates() {
    let harness = Harness::new(3);
    let mut page = FakePage::new().with_pages(vec![
        listing(&["A", "B"]),
        listing(&["B", "C"]),
        listing(&["C", "A"]),
    ]);
    let report = harness.run(&mut page).await;

    let added: Vec<usize> = report.cycles.iter().map(|c| c.added).collect();
    assert_eq!(added, vec![2, 1, 0]);
    assert_eq!(report.added, 3);
    assert_eq!(report.total, 3);
    assert_eq!(harness.stored_names(), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn expansion_error_still_extracts_and_merges() {
    let harness = Harness::new(1);
    let mut page = FakePage::new()
        .with_expansions(2, true)
        .with_pages(vec![listing(&["A", "B"])])
        .failing_at(FailPoint::Invoke);
    let report = harness.run(&mut page).await;

    assert!(report.succeeded());
    assert!(matches!(
        report.cycles[0].end,
        ExpansionEnd::Error(ProviderError::Interaction { .. })
    ));
    assert_eq!(report.cycles[0].extracted, 2);
    assert_eq!(harness.stored_names(), vec!["A", "B"]);
}

#[tokio::test]
async fn expand_query_error_ends_cycle_not_session() {
    let harness = Harness::new(2);
    let mut page = FakePage::new()
        .with_pages(vec![listing(&["A"])])
        .failing_at(FailPoint::ExpandQuery);
    let report = harness.run(&mut page).await;

    assert!(report.succeeded());
    assert_eq!(report.cycles.len(), 2);
    assert!(report.cycles.iter().all(|c| c.end.label() == "error"));
}

#[tokio::test]
async fn cycle_reports_carry_expansion_end() {
    let harness = Harness::new(1);
    let mut page = FakePage::new()
        .with_expansions(3, true)
        .with_pages(vec![listing(&["A"])]);
    let report = harness.run(&mut page).await;
    assert!(matches!(report.cycles[0].end, ExpansionEnd::Terminal));
    assert_eq!(report.cycles[0].expansions, 3);
}

#[tokio::test]
async fn navigation_failure_aborts_with_error_and_final_diagnostics() {
    let harness = Harness::new(5);
    let mut page = FakePage::new()
        .failing_at(FailPoint::Navigate)
        .with_exported_credentials(b"[]");
    let report = harness.run(&mut page).await;

    assert!(matches!(
        report.status,
        SessionStatus::Failed(HarvestError::Provider(ProviderError::Navigation { .. }))
    ));
    assert!(report.cycles.is_empty());
    assert_eq!(harness.diagnostics.labels(), vec!["error", "final"]);
    assert_eq!(harness.credentials.load().unwrap().as_deref(), Some(b"[]".as_slice()));
}

#[tokio::test]
async fn reload_failure_keeps_earlier_cycles() {
    let harness = Harness::new(4);
    let mut page = FakePage::new()
        .with_pages(vec![listing(&["A", "B"])])
        .failing_at(FailPoint::Reload(2));
    let report = harness.run(&mut page).await;

    assert!(!report.succeeded());
    assert_eq!(report.cycles.len(), 2);
    assert_eq!(report.total, 2);
    assert_eq!(harness.stored_names(), vec!["A", "B"]);
}

#[tokio::test]
async fn snapshot_failure_is_critical() {
    let harness = Harness::new(2);
    let mut page = FakePage::new().failing_at(FailPoint::Snapshot);
    let report = harness.run(&mut page).await;
    assert!(matches!(
        report.status,
        SessionStatus::Failed(HarvestError::Provider(ProviderError::Query { .. }))
    ));
    assert!(!harness.store.path_for("electronics").exists());
}

#[tokio::test]
async fn store_write_failure_is_critical() {
    let harness = Harness::new(2);
    // A plain file where the data directory should be.
    std::fs::write(harness.store.data_dir(), b"not a dir").unwrap();
    let mut page = FakePage::new().with_pages(vec![listing(&["A"])]);
    let report = harness.run(&mut page).await;
    assert!(matches!(
        report.status,
        SessionStatus::Failed(HarvestError::Store(_))
    ));
    assert_eq!(page.loads, 1);
}

#[tokio::test]
async fn successful_session_captures_only_final_diagnostics() {
    let harness = Harness::new(1);
    let mut page = FakePage::new().with_pages(vec![listing(&["A"])]);
    harness.run(&mut page).await;
    assert_eq!(harness.diagnostics.labels(), vec!["final"]);
    assert_eq!(page.diagnostics_taken, 1);
}

#[tokio::test]
async fn stored_credentials_are_applied_and_refreshed() {
    let harness = Harness::new(1);
    harness.credentials.save(b"old-cookies").unwrap();
    let mut page = FakePage::new()
        .with_pages(vec![listing(&["A"])])
        .with_exported_credentials(b"new-cookies");
    harness.run(&mut page).await;

    assert_eq!(page.applied_credentials.as_deref(), Some(b"old-cookies".as_slice()));
    assert_eq!(
        harness.credentials.load().unwrap().as_deref(),
        Some(b"new-cookies".as_slice())
    );
}

#[tokio::test]
async fn missing_credentials_start_fresh() {
    let harness = Harness::new(1);
    let mut page = FakePage::new().with_pages(vec![listing(&["A"])]);
    let report = harness.run(&mut page).await;
    assert!(report.succeeded());
    assert!(page.applied_credentials.is_none());
    assert!(harness.credentials.load().unwrap().is_none());
}

#[tokio::test]
async fn relative_links_resolve_against_site_origin() {
    let harness = Harness::new(1);
    let mut page = FakePage::new().with_pages(vec![listing(&["Kettle"])]);
    harness.run(&mut page).await;
    let items = harness.store.load("electronics").items;
    assert_eq!(items[0].url, "https://shop.example.com/p/Kettle");
}
