//! Randomized, human-like pacing for page interaction.
//!
//! All waits go through [`Pacer`], which owns a seedable RNG so tests can
//! replay a scroll pass deterministically and run with every wait zeroed.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive `[min, max]` range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min: u64,
    pub max: u64,
}

impl Span {
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn fixed(value: u64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn sample(self, rng: &mut StdRng) -> u64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

/// Step sizes, probabilities, and waits used while revealing a page.
///
/// Distances are in page scroll units; waits are in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    pub scroll_step: Span,
    pub scroll_pause_ms: Span,
    /// Chance per step of backing up instead of advancing.
    pub retreat_probability: f64,
    pub retreat_step: Span,
    pub retreat_pause_ms: Span,
    /// Wait after reaching the bottom so the last cards render.
    pub settle_ms: u64,
    /// Wait between scrolling the expand control into view and invoking it.
    pub pre_invoke_ms: u64,
    /// Wait after invoking the expand control for new cards to appear.
    pub expand_dwell_ms: u64,
    /// Wait after a navigation or reload.
    pub load_wait_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scroll_step: Span::new(300, 700),
            scroll_pause_ms: Span::new(300, 1500),
            retreat_probability: 0.1,
            retreat_step: Span::new(100, 300),
            retreat_pause_ms: Span::new(500, 1000),
            settle_ms: 1000,
            pre_invoke_ms: 1000,
            expand_dwell_ms: 3000,
            load_wait_ms: 5000,
        }
    }
}

impl PacingConfig {
    /// Default step sizes with every wait set to zero.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            scroll_pause_ms: Span::fixed(0),
            retreat_pause_ms: Span::fixed(0),
            settle_ms: 0,
            pre_invoke_ms: 0,
            expand_dwell_ms: 0,
            load_wait_ms: 0,
            ..Self::default()
        }
    }
}

pub struct Pacer {
    config: PacingConfig,
    rng: StdRng,
}

impl Pacer {
    #[must_use]
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// A pacer whose random choices replay identically for the same seed.
    #[must_use]
    pub fn seeded(config: PacingConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    pub(crate) fn should_retreat(&mut self) -> bool {
        let p = self.config.retreat_probability.clamp(0.0, 1.0);
        self.rng.random_bool(p)
    }

    pub(crate) fn scroll_step(&mut self) -> u64 {
        self.config.scroll_step.sample(&mut self.rng)
    }

    pub(crate) fn retreat_step(&mut self) -> u64 {
        self.config.retreat_step.sample(&mut self.rng)
    }

    pub(crate) async fn scroll_pause(&mut self) {
        let ms = self.config.scroll_pause_ms.sample(&mut self.rng);
        sleep_ms(ms).await;
    }

    pub(crate) async fn retreat_pause(&mut self) {
        let ms = self.config.retreat_pause_ms.sample(&mut self.rng);
        sleep_ms(ms).await;
    }

    pub(crate) async fn settle(&self) {
        sleep_ms(self.config.settle_ms).await;
    }

    pub(crate) async fn pre_invoke(&self) {
        sleep_ms(self.config.pre_invoke_ms).await;
    }

    pub(crate) async fn expand_dwell(&self) {
        sleep_ms(self.config.expand_dwell_ms).await;
    }

    pub(crate) async fn load_wait(&self) {
        sleep_ms(self.config.load_wait_ms).await;
    }
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
