//! Decoding product cards out of a page snapshot.
//!
//! This is the only place that knows about markup. Everything downstream
//! works with [`RawCard`], whose fields are exactly what was found on the
//! card and nothing more: `None` means "no such element on this card", and
//! an element that is present but empty decodes as `Some("")`.

use harvest_core::CardSelectors;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::provider::PageSnapshot;

/// One product card as found on the page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: Option<String>,
    pub href: Option<String>,
    pub image: Option<String>,
    pub rating: Option<String>,
    /// Every candidate label in card order; normalization picks the sold count.
    pub sold_labels: Vec<String>,
    pub price: Option<String>,
    pub discount: Option<String>,
    pub original_price: Option<String>,
}

/// Compiled card selectors.
#[derive(Debug)]
pub struct CardDecoder {
    card: Selector,
    image: Selector,
    link: Selector,
    title: Selector,
    rating: Selector,
    sold: Selector,
    price: Selector,
    discount: Selector,
    original_price: Selector,
}

impl CardDecoder {
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidSelector`] naming the first selector
    /// that does not parse.
    pub fn new(selectors: &CardSelectors) -> Result<Self, ExtractionError> {
        Ok(Self {
            card: compile(&selectors.card)?,
            image: compile(&selectors.image)?,
            link: compile(&selectors.link)?,
            title: compile(&selectors.title)?,
            rating: compile(&selectors.rating)?,
            sold: compile(&selectors.sold)?,
            price: compile(&selectors.price)?,
            discount: compile(&selectors.discount)?,
            original_price: compile(&selectors.original_price)?,
        })
    }

    /// All cards on the page, in document order.
    #[must_use]
    pub fn decode(&self, snapshot: &PageSnapshot) -> Vec<RawCard> {
        let document = Html::parse_document(&snapshot.html);
        document
            .select(&self.card)
            .map(|card| self.decode_card(card))
            .collect()
    }

    fn decode_card(&self, card: ElementRef<'_>) -> RawCard {
        RawCard {
            title: first_text(card, &self.title),
            href: first_attr(card, &self.link, "href"),
            image: first_attr(card, &self.image, "src"),
            rating: first_text(card, &self.rating),
            sold_labels: card
                .select(&self.sold)
                .map(stripped_text)
                .filter(|label| !label.is_empty())
                .collect(),
            price: first_text(card, &self.price),
            discount: first_text(card, &self.discount),
            original_price: first_text(card, &self.original_price),
        }
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Concatenation of every text node, each trimmed.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(stripped_text)
}

/// The attribute of the first match; a match without the attribute is `""`.
fn first_attr(card: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.value().attr(attr).unwrap_or_default().to_owned())
}
