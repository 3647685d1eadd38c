use serde::{Deserialize, Serialize};

/// Placeholder stored when a card carries no title, link, or image.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder stored when a card carries no rating, sold count, or price.
pub const ZERO: &str = "0";

/// A product card normalized for storage and cross-category comparison.
///
/// Every field deserializes with its default so that hand-edited or partial
/// store records (`{"name": "Phone"}`) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Deduplication key. `"N/A"` when the card had no title element and
    /// empty when the element was blank; either way every such card shares
    /// one slot.
    #[serde(default)]
    pub name: String,
    /// Absolute product URL, or `"N/A"`.
    #[serde(default = "not_available")]
    pub url: String,
    #[serde(default = "not_available")]
    pub image: String,
    #[serde(default = "zero")]
    pub rating: String,
    /// Display text as shown on the card, lower-cased (e.g. `"10rb+ terjual"`).
    #[serde(default = "zero")]
    pub sold_quantity: String,
    /// Display price including currency, e.g. `"Rp10.000"`.
    #[serde(default = "zero")]
    pub price_current: String,
    /// Pre-discount price; set together with `discount` or not at all.
    #[serde(default)]
    pub price_original: Option<String>,
    #[serde(default)]
    pub discount: Option<String>,
    /// Categories a conflicting name was found in, in first-encounter order.
    /// Only the conflict resolver populates this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_in: Option<Vec<String>>,
}

impl Item {
    /// An item with the given name and every other field at its default.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: not_available(),
            image: not_available(),
            rating: zero(),
            sold_quantity: zero(),
            price_current: zero(),
            price_original: None,
            discount: None,
            detected_in: None,
        }
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn zero() -> String {
    ZERO.to_string()
}
