//! The page-rendering collaborator the ingestion pipeline drives.
//!
//! Implementations own a live page (a browser tab, or a fetched document) and
//! expose only the primitives the expansion loop and extractor need. Calls
//! block until the page is quiescent; no timeout is imposed here, so
//! implementations backed by a real browser must bound their own calls.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Opaque reference to a "reveal more" affordance found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle(pub String);

/// The rendered page at one point in time.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

#[async_trait]
pub trait PageProvider: Send {
    /// Load `url` fresh.
    async fn navigate(&mut self, url: &str) -> Result<(), ProviderError>;

    /// Reload the current page.
    async fn reload(&mut self) -> Result<(), ProviderError>;

    /// Total scrollable height revealed so far.
    async fn revealed_height(&mut self) -> Result<u64, ProviderError>;

    async fn scroll_to(&mut self, position: u64) -> Result<(), ProviderError>;

    /// Whether an explicit "no more content" indicator is showing.
    async fn find_terminal_marker(&mut self) -> Result<bool, ProviderError>;

    async fn find_expand_control(&mut self) -> Result<Option<ControlHandle>, ProviderError>;

    async fn scroll_into_view(&mut self, control: &ControlHandle) -> Result<(), ProviderError>;

    async fn invoke(&mut self, control: &ControlHandle) -> Result<(), ProviderError>;

    async fn snapshot(&mut self) -> Result<PageSnapshot, ProviderError>;

    /// Screenshot-equivalent bytes for post-mortem inspection. Providers
    /// without a visual surface return `Ok(None)`.
    async fn capture_diagnostics(&mut self) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(None)
    }

    /// Install session-cookie material before the first navigation.
    async fn apply_credentials(&mut self, _blob: &[u8]) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Session-cookie material to persist once the session ends.
    async fn export_credentials(&mut self) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(None)
    }
}
