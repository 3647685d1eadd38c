use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Report key used for cross-category items; no category may share it.
pub const CONFLICTS_KEY: &str = "conflicts";

/// A named catalog segment and the listing page it is harvested from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTarget {
    pub name: String,
    pub url: String,
}

impl CategoryTarget {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// CSS selectors used to decode product cards out of a page snapshot.
///
/// Every field is optional in the categories file; omitted keys fall back to
/// the listing layout the harvester was built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSelectors {
    pub card: String,
    pub image: String,
    pub link: String,
    pub title: String,
    pub rating: String,
    /// Matches every candidate label; the one mentioning "sold" wins.
    pub sold: String,
    pub price: String,
    pub discount: String,
    /// Struck-through pre-discount price.
    pub original_price: String,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: "div.w-full.cursor-pointer".to_string(),
            image: "div.relative img".to_string(),
            link: "a[href]".to_string(),
            title: "h3".to_string(),
            rating: "span.P3-Semibold".to_string(),
            sold: "span.P3-Regular".to_string(),
            price: "span.H2-Semibold.text-color-UIText1".to_string(),
            discount: "span.H2-Regular.text-color-UITextPrimary".to_string(),
            original_price: "span.line-through".to_string(),
        }
    }
}

/// On-page texts that drive the expansion loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMarkers {
    /// Text shown once a listing has nothing more to reveal.
    pub terminal_text: String,
}

impl Default for PageMarkers {
    fn default() -> Self {
        Self {
            terminal_text: "No more products".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryTarget>,
    #[serde(default)]
    pub selectors: CardSelectors,
    #[serde(default)]
    pub markers: PageMarkers,
}

impl CategoriesFile {
    /// Category names in file order, which is also the resolver's iteration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CategoryTarget> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Load and validate the categories configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_categories(&content)
}

/// Parse and validate categories YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_categories(content: &str) -> Result<CategoriesFile, ConfigError> {
    let file: CategoriesFile =
        serde_yaml::from_str(content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&file)?;

    Ok(file)
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for category in &file.categories {
        let name = category.name.as_str();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        // Names become store file names.
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "category '{name}' may only contain lowercase letters, digits, '-' and '_'"
            )));
        }

        if name == CONFLICTS_KEY {
            return Err(ConfigError::Validation(format!(
                "category name '{CONFLICTS_KEY}' is reserved for the conflict report"
            )));
        }

        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{name}'"
            )));
        }

        let url = reqwest::Url::parse(&category.url).map_err(|e| {
            ConfigError::Validation(format!(
                "category '{name}' has invalid url \"{}\": {e}",
                category.url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "category '{name}' url must be http(s), got \"{}\"",
                category.url
            )));
        }
    }

    Ok(())
}
