//! Normalization from [`RawCard`] to [`harvest_core::Item`].
//!
//! Each card is handled independently. A card that cannot be normalized is
//! skipped and counted; it never aborts the rest of the batch.

use harvest_core::{Item, NOT_AVAILABLE, ZERO};
use reqwest::Url;

use crate::cards::RawCard;
use crate::error::ExtractionError;

/// Sold-count labels contain one of these (lower-cased) words.
const SOLD_KEYWORDS: [&str; 2] = ["sold", "terjual"];

/// Items normalized from one snapshot, plus how many cards were dropped.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    pub items: Vec<Item>,
    pub skipped: usize,
}

/// Normalizes one card.
///
/// # Errors
///
/// Returns [`ExtractionError::InvalidUrl`] if the card's link is neither an
/// absolute URL nor a path that joins onto `origin`.
pub fn normalize_card(card: RawCard, origin: &Url) -> Result<Item, ExtractionError> {
    let url = match card.href {
        Some(href) => resolve_href(&href, origin)?,
        None => NOT_AVAILABLE.to_string(),
    };

    // Discount fields travel as a pair.
    let (discount, price_original) = match (card.discount, card.original_price) {
        (Some(discount), Some(original)) => (Some(discount), Some(original)),
        _ => (None, None),
    };

    Ok(Item {
        name: card.title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        url,
        image: card.image.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        rating: card.rating.unwrap_or_else(|| ZERO.to_string()),
        sold_quantity: sold_quantity(&card.sold_labels),
        price_current: card.price.unwrap_or_else(|| ZERO.to_string()),
        price_original,
        discount,
        detected_in: None,
    })
}

/// Normalizes every card, skipping (and logging) the ones that fail.
pub fn extract_items(cards: Vec<RawCard>, origin: &Url) -> ExtractionBatch {
    let mut batch = ExtractionBatch {
        items: Vec::with_capacity(cards.len()),
        skipped: 0,
    };

    for (index, card) in cards.into_iter().enumerate() {
        match normalize_card(card, origin) {
            Ok(item) => batch.items.push(item),
            Err(e) => {
                tracing::warn!(card = index, error = %e, "skipping card");
                batch.skipped += 1;
            }
        }
    }

    batch
}

/// Absolute and empty links are kept verbatim; anything else is joined onto
/// `origin`.
fn resolve_href(href: &str, origin: &Url) -> Result<String, ExtractionError> {
    if href.is_empty() {
        return Ok(String::new());
    }
    let resolved = if href.starts_with("http") {
        Url::parse(href).map(|_| href.to_string())
    } else {
        origin.join(href).map(String::from)
    };
    resolved.map_err(|e| ExtractionError::InvalidUrl {
        href: href.to_string(),
        reason: e.to_string(),
    })
}

fn sold_quantity(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| label.to_lowercase())
        .find(|label| SOLD_KEYWORDS.iter().any(|k| label.contains(k)))
        .unwrap_or_else(|| ZERO.to_string())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
