//! Human-like scroll to the bottom of a lazily-loading listing.

use crate::error::ProviderError;
use crate::pacing::Pacer;
use crate::provider::PageProvider;

/// Upper bound on scroll steps in one pass. A page that keeps growing
/// faster than we scroll would otherwise never let the pass finish.
pub(crate) const MAX_SCROLL_STEPS: u32 = 10_000;

/// What one scroll pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPass {
    pub steps: u32,
    pub retreats: u32,
    pub position: u64,
    /// Revealed height when the pass finished.
    pub height: u64,
}

/// Scrolls in randomized steps until the position reaches the revealed
/// height, re-reading the height after every step so lists that grow while
/// scrolling are followed to their new end.
///
/// # Errors
///
/// Propagates the first [`ProviderError`] from a height query or scroll.
pub async fn scroll_to_bottom<P>(
    provider: &mut P,
    pacer: &mut Pacer,
) -> Result<ScrollPass, ProviderError>
where
    P: PageProvider + ?Sized,
{
    let mut pass = ScrollPass {
        height: provider.revealed_height().await?,
        ..ScrollPass::default()
    };

    while pass.position < pass.height {
        if pass.steps >= MAX_SCROLL_STEPS {
            tracing::warn!(
                steps = pass.steps,
                position = pass.position,
                height = pass.height,
                "scroll step limit reached before bottom; treating as bottom"
            );
            break;
        }
        pass.steps += 1;

        if pacer.should_retreat() {
            pass.position = pass.position.saturating_sub(pacer.retreat_step());
            provider.scroll_to(pass.position).await?;
            pacer.retreat_pause().await;
            pass.retreats += 1;
        } else {
            pass.position = pass.position.saturating_add(pacer.scroll_step());
            provider.scroll_to(pass.position).await?;
            pacer.scroll_pause().await;
        }

        let height = provider.revealed_height().await?;
        if height > pass.height {
            pass.height = height;
        }
    }

    pacer.settle().await;
    tracing::debug!(
        steps = pass.steps,
        retreats = pass.retreats,
        height = pass.height,
        "reached the bottom"
    );
    Ok(pass)
}
