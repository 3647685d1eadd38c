//! The "reveal more" loop for one category page.
//!
//! ```text
//! Scanning ──terminal marker──▶ Ended(Terminal)
//!    │ ▲
//!    │ └──────── Expanding(control) ◀── expand control found
//!    └──neither found──▶ Ended(Stalled)
//! any provider failure ──▶ Ended(Error)
//! ```
//!
//! Every end state hands control back to the orchestrator, which extracts
//! whatever the page currently shows.

use crate::error::ProviderError;
use crate::pacing::Pacer;
use crate::provider::{ControlHandle, PageProvider};
use crate::scroll::scroll_to_bottom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionConfig {
    /// Expand-control invocations allowed in one run before it is ended as
    /// stalled. Guards against a control that never disappears.
    pub max_expansions: u32,
    /// Log progress every this many expansions.
    pub progress_every: u32,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_expansions: 500,
            progress_every: 5,
        }
    }
}

/// Why an expansion run stopped.
#[derive(Debug)]
pub enum ExpansionEnd {
    /// The page showed its explicit "no more content" marker.
    Terminal,
    /// Neither the marker nor an expand control was found. Benign: many
    /// pages never render a terminal marker.
    Stalled,
    /// A provider call failed mid-run.
    Error(ProviderError),
}

impl ExpansionEnd {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ExpansionEnd::Terminal => "terminal",
            ExpansionEnd::Stalled => "stalled",
            ExpansionEnd::Error(_) => "error",
        }
    }
}

#[derive(Debug)]
pub enum ExpansionState {
    Scanning,
    Expanding(ControlHandle),
    Ended(ExpansionEnd),
}

#[derive(Debug)]
pub struct ExpansionOutcome {
    pub end: ExpansionEnd,
    pub expansions: u32,
    pub scroll_steps: u32,
}

pub struct ExpansionMachine<'a> {
    category: &'a str,
    config: ExpansionConfig,
    pacer: &'a mut Pacer,
    expansions: u32,
    scroll_steps: u32,
}

impl<'a> ExpansionMachine<'a> {
    pub fn new(category: &'a str, config: ExpansionConfig, pacer: &'a mut Pacer) -> Self {
        Self {
            category,
            config,
            pacer,
            expansions: 0,
            scroll_steps: 0,
        }
    }

    /// Drives the machine from `Scanning` until an end state.
    pub async fn run<P>(mut self, provider: &mut P) -> ExpansionOutcome
    where
        P: PageProvider + ?Sized,
    {
        let mut state = ExpansionState::Scanning;
        loop {
            state = match state {
                ExpansionState::Ended(end) => {
                    return ExpansionOutcome {
                        end,
                        expansions: self.expansions,
                        scroll_steps: self.scroll_steps,
                    };
                }
                other => self.step(provider, other).await,
            };
        }
    }

    /// Performs one transition. End states are returned unchanged.
    pub async fn step<P>(&mut self, provider: &mut P, state: ExpansionState) -> ExpansionState
    where
        P: PageProvider + ?Sized,
    {
        let next = match state {
            ExpansionState::Scanning => self.scan(provider).await,
            ExpansionState::Expanding(control) => self.expand(provider, &control).await,
            ended @ ExpansionState::Ended(_) => return ended,
        };

        next.unwrap_or_else(|e| {
            tracing::warn!(
                category = self.category,
                expansions = self.expansions,
                error = %e,
                "expansion interrupted"
            );
            ExpansionState::Ended(ExpansionEnd::Error(e))
        })
    }

    async fn scan<P>(&mut self, provider: &mut P) -> Result<ExpansionState, ProviderError>
    where
        P: PageProvider + ?Sized,
    {
        let pass = scroll_to_bottom(provider, self.pacer).await?;
        self.scroll_steps = self.scroll_steps.saturating_add(pass.steps);

        // The explicit marker wins: a missing expand control alone could just
        // mean the page is still loading.
        if provider.find_terminal_marker().await? {
            tracing::info!(
                category = self.category,
                expansions = self.expansions,
                "reached end-of-list marker"
            );
            return Ok(ExpansionState::Ended(ExpansionEnd::Terminal));
        }

        if let Some(control) = provider.find_expand_control().await? {
            if self.expansions >= self.config.max_expansions {
                tracing::warn!(
                    category = self.category,
                    max_expansions = self.config.max_expansions,
                    "expansion limit reached with control still present; stopping"
                );
                return Ok(ExpansionState::Ended(ExpansionEnd::Stalled));
            }
            return Ok(ExpansionState::Expanding(control));
        }

        tracing::info!(
            category = self.category,
            expansions = self.expansions,
            "expand control gone without end-of-list marker; stopping"
        );
        Ok(ExpansionState::Ended(ExpansionEnd::Stalled))
    }

    async fn expand<P>(
        &mut self,
        provider: &mut P,
        control: &ControlHandle,
    ) -> Result<ExpansionState, ProviderError>
    where
        P: PageProvider + ?Sized,
    {
        provider.scroll_into_view(control).await?;
        self.pacer.pre_invoke().await;
        provider.invoke(control).await?;
        self.expansions += 1;
        self.pacer.expand_dwell().await;

        if self.config.progress_every > 0 && self.expansions % self.config.progress_every == 0 {
            tracing::info!(
                category = self.category,
                expansions = self.expansions,
                "expanded listing"
            );
        }

        Ok(ExpansionState::Scanning)
    }
}
