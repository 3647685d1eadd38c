use std::path::PathBuf;

use thiserror::Error;

/// A Page Provider call failed. The expansion loop ends its cycle on any of
/// these; the orchestrator treats failures outside the loop as critical.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("page query '{query}' failed: {reason}")]
    Query { query: String, reason: String },

    #[error("interaction with {target} failed: {reason}")]
    Interaction { target: String, reason: String },

    #[error("credential blob is not a cookie export: {0}")]
    Credentials(String),

    #[error("no page loaded; navigate before {0}")]
    NotNavigated(&'static str),

    #[error("operation not supported by this provider: {0}")]
    Unsupported(&'static str),
}

/// A single card could not be normalized, or the card query itself is broken.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid product link \"{href}\": {reason}")]
    InvalidUrl { href: String, reason: String },

    #[error("invalid card selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Store file access failed.
///
/// `Io` and `Corrupt` raised while loading are recovered by treating the
/// store as empty; raised while writing they are returned as errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} is not a valid item list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Credential or diagnostics port failure.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The conflict resolver was given inputs it cannot partition.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("conflict resolution needs at least 2 categories, got {found}")]
    TooFewCategories { found: usize },

    #[error("category '{0}' listed more than once")]
    DuplicateCategory(String),

    #[error("category name '{0}' collides with the conflicts report key")]
    ReservedCategory(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A failure that escapes a cycle and aborts the category session.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("page provider failure: {0}")]
    Provider(#[from] ProviderError),

    #[error("card extraction failure: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}
