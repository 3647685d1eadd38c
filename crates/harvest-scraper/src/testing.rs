//! Scripted in-memory page used by unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::{ControlHandle, PageProvider, PageSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailPoint {
    Navigate,
    /// Fails the n-th reload (1-based).
    Reload(u32),
    Height,
    TerminalQuery,
    ExpandQuery,
    Invoke,
    Snapshot,
}

pub(crate) struct FakePage {
    /// Heights returned by successive queries; the last one repeats.
    heights: VecDeque<u64>,
    /// Expand-control clicks available after each load.
    expansions_per_load: u32,
    remaining_expansions: u32,
    /// Show the terminal marker once expansions run out.
    terminal_when_exhausted: bool,
    /// Show the terminal marker regardless of remaining expansions.
    terminal_always: bool,
    /// HTML served per load; the last one repeats.
    pages: Vec<String>,
    fail_at: Option<FailPoint>,
    pub(crate) loads: u32,
    pub(crate) reloads: u32,
    pub(crate) invocations: u32,
    pub(crate) scroll_positions: Vec<u64>,
    pub(crate) applied_credentials: Option<Vec<u8>>,
    pub(crate) exported_credentials: Option<Vec<u8>>,
    pub(crate) diagnostics_taken: u32,
}

impl FakePage {
    pub(crate) fn new() -> Self {
        Self {
            heights: VecDeque::from(vec![1200]),
            expansions_per_load: 0,
            remaining_expansions: 0,
            terminal_when_exhausted: false,
            terminal_always: false,
            pages: vec![String::new()],
            fail_at: None,
            loads: 0,
            reloads: 0,
            invocations: 0,
            scroll_positions: Vec::new(),
            applied_credentials: None,
            exported_credentials: None,
            diagnostics_taken: 0,
        }
    }

    pub(crate) fn with_heights(mut self, heights: Vec<u64>) -> Self {
        self.heights = heights.into();
        self
    }

    pub(crate) fn with_expansions(mut self, per_load: u32, terminal_when_exhausted: bool) -> Self {
        self.expansions_per_load = per_load;
        self.remaining_expansions = per_load;
        self.terminal_when_exhausted = terminal_when_exhausted;
        self
    }

    pub(crate) fn with_terminal_always(mut self) -> Self {
        self.terminal_always = true;
        self
    }

    pub(crate) fn with_pages(mut self, pages: Vec<String>) -> Self {
        self.pages = pages;
        self
    }

    pub(crate) fn with_exported_credentials(mut self, blob: &[u8]) -> Self {
        self.exported_credentials = Some(blob.to_vec());
        self
    }

    pub(crate) fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    fn fails(&self, point: FailPoint) -> bool {
        self.fail_at == Some(point)
    }

    fn on_load(&mut self) {
        self.loads += 1;
        self.remaining_expansions = self.expansions_per_load;
    }
}

fn query_failure(query: &str) -> ProviderError {
    ProviderError::Query {
        query: query.to_string(),
        reason: "scripted failure".to_string(),
    }
}

#[async_trait]
impl PageProvider for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), ProviderError> {
        if self.fails(FailPoint::Navigate) {
            return Err(ProviderError::Navigation {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.on_load();
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), ProviderError> {
        self.reloads += 1;
        if self.fails(FailPoint::Reload(self.reloads)) {
            return Err(ProviderError::Navigation {
                url: "about:reload".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.on_load();
        Ok(())
    }

    async fn revealed_height(&mut self) -> Result<u64, ProviderError> {
        if self.fails(FailPoint::Height) {
            return Err(query_failure("height"));
        }
        let height = if self.heights.len() > 1 {
            self.heights.pop_front()
        } else {
            self.heights.front().copied()
        };
        Ok(height.unwrap_or(0))
    }

    async fn scroll_to(&mut self, position: u64) -> Result<(), ProviderError> {
        self.scroll_positions.push(position);
        Ok(())
    }

    async fn find_terminal_marker(&mut self) -> Result<bool, ProviderError> {
        if self.fails(FailPoint::TerminalQuery) {
            return Err(query_failure("terminal marker"));
        }
        Ok(self.terminal_always
            || (self.terminal_when_exhausted && self.remaining_expansions == 0))
    }

    async fn find_expand_control(&mut self) -> Result<Option<ControlHandle>, ProviderError> {
        if self.fails(FailPoint::ExpandQuery) {
            return Err(query_failure("expand control"));
        }
        Ok((self.remaining_expansions > 0).then(|| ControlHandle("view-more".to_string())))
    }

    async fn scroll_into_view(&mut self, _control: &ControlHandle) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn invoke(&mut self, control: &ControlHandle) -> Result<(), ProviderError> {
        if self.fails(FailPoint::Invoke) {
            return Err(ProviderError::Interaction {
                target: control.0.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.invocations += 1;
        self.remaining_expansions = self.remaining_expansions.saturating_sub(1);
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot, ProviderError> {
        if self.fails(FailPoint::Snapshot) {
            return Err(query_failure("snapshot"));
        }
        let idx = (self.loads as usize).saturating_sub(1).min(self.pages.len() - 1);
        Ok(PageSnapshot {
            url: "https://shop.example.com/c/test".to_string(),
            html: self.pages[idx].clone(),
        })
    }

    async fn capture_diagnostics(&mut self) -> Result<Option<Vec<u8>>, ProviderError> {
        self.diagnostics_taken += 1;
        Ok(Some(b"capture".to_vec()))
    }

    async fn apply_credentials(&mut self, blob: &[u8]) -> Result<(), ProviderError> {
        self.applied_credentials = Some(blob.to_vec());
        Ok(())
    }

    async fn export_credentials(&mut self) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(self.exported_credentials.clone())
    }
}
