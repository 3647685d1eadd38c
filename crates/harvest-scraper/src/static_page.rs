//! A [`PageProvider`] for catalog pages rendered server-side.
//!
//! Pages are fetched with a plain HTTP GET. There is no viewport, so the
//! revealed height is always zero and there is never an expand control; the
//! expansion loop therefore ends after one pass, as `Terminal` when the
//! configured end-of-list text is in the document and `Stalled` otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::provider::{ControlHandle, PageProvider, PageSnapshot};
use crate::retry::retry_with_backoff;

/// One cookie from a browser cookie export.
#[derive(Debug, Clone, Deserialize)]
struct ExportedCookie {
    name: String,
    value: String,
    #[serde(default)]
    domain: Option<String>,
}

/// Browser exports are either a bare array or wrapped in `{"cookies": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CookieExport {
    List(Vec<ExportedCookie>),
    Wrapped { cookies: Vec<ExportedCookie> },
}

impl CookieExport {
    fn into_cookies(self) -> Vec<ExportedCookie> {
        match self {
            CookieExport::List(cookies) | CookieExport::Wrapped { cookies } => cookies,
        }
    }
}

impl ExportedCookie {
    /// Host-only cookies (no domain) and exact or parent-domain matches apply.
    fn applies_to(&self, host: &str) -> bool {
        let Some(domain) = self.domain.as_deref() else {
            return true;
        };
        let domain = domain.trim_start_matches('.');
        host.eq_ignore_ascii_case(domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
    }
}

pub struct StaticPageProvider {
    client: Client,
    terminal_text: String,
    max_retries: u32,
    backoff_base_secs: u64,
    cookies: Vec<ExportedCookie>,
    credentials: Option<Vec<u8>>,
    current: Option<PageSnapshot>,
}

impl StaticPageProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        terminal_text: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            terminal_text: terminal_text.into(),
            max_retries: 0,
            backoff_base_secs: 0,
            cookies: Vec::new(),
            credentials: None,
            current: None,
        })
    }

    /// Retry transient fetch failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.applies_to(host))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    async fn fetch(&self, url: &Url) -> Result<PageSnapshot, ProviderError> {
        let cookie = self.cookie_header(url);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let cookie = cookie.clone();
            async move {
                let mut request = self
                    .client
                    .get(url.clone())
                    .header(
                        header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .header(header::ACCEPT_LANGUAGE, "id-ID,id;q=0.9,en-US;q=0.8");
                if let Some(cookie) = cookie {
                    request = request.header(header::COOKIE, cookie);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let final_url = response.url().to_string();
                let html = response.text().await?;
                Ok(PageSnapshot {
                    url: final_url,
                    html,
                })
            }
        })
        .await
    }

    fn current(&self, operation: &'static str) -> Result<&PageSnapshot, ProviderError> {
        self.current
            .as_ref()
            .ok_or(ProviderError::NotNavigated(operation))
    }
}

#[async_trait]
impl PageProvider for StaticPageProvider {
    async fn navigate(&mut self, url: &str) -> Result<(), ProviderError> {
        let parsed = Url::parse(url).map_err(|e| ProviderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let page = self.fetch(&parsed).await?;
        tracing::debug!(url = %page.url, bytes = page.html.len(), "page fetched");
        self.current = Some(page);
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), ProviderError> {
        let url = self.current("reload")?.url.clone();
        self.navigate(&url).await
    }

    async fn revealed_height(&mut self) -> Result<u64, ProviderError> {
        Ok(0)
    }

    async fn scroll_to(&mut self, _position: u64) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn find_terminal_marker(&mut self) -> Result<bool, ProviderError> {
        let page = self.current("find_terminal_marker")?;
        Ok(!self.terminal_text.is_empty() && page.html.contains(&self.terminal_text))
    }

    async fn find_expand_control(&mut self) -> Result<Option<ControlHandle>, ProviderError> {
        self.current("find_expand_control")?;
        Ok(None)
    }

    async fn scroll_into_view(&mut self, _control: &ControlHandle) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("scroll_into_view"))
    }

    async fn invoke(&mut self, _control: &ControlHandle) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("invoke"))
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot, ProviderError> {
        self.current("snapshot").cloned()
    }

    async fn apply_credentials(&mut self, blob: &[u8]) -> Result<(), ProviderError> {
        let export: CookieExport = serde_json::from_slice(blob)
            .map_err(|e| ProviderError::Credentials(e.to_string()))?;
        self.cookies = export.into_cookies();
        self.credentials = Some(blob.to_vec());
        tracing::debug!(cookies = self.cookies.len(), "credentials applied");
        Ok(())
    }

    /// Cookies are not refreshed from responses, so the applied blob is
    /// handed back unchanged.
    async fn export_credentials(&mut self) -> Result<Option<Vec<u8>>, ProviderError> {
        Ok(self.credentials.clone())
    }
}
