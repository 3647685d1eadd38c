//! Cross-category reconciliation.
//!
//! Given the stores of two or more categories, every distinct (trimmed,
//! non-blank) name lands in exactly one place: the unique list of the single
//! category it was found in, or the `conflicts` list when it was found in
//! several. The first instance seen for a name is the one reported.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use harvest_core::{Item, CONFLICTS_KEY};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ResolveError, StoreError};
use crate::store::{write_json_atomic, JsonStore};

/// Partitioned output of [`resolve`].
///
/// Serializes as one JSON object: a key per category, in input order, then
/// `conflicts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    pub unique: Vec<(String, Vec<Item>)>,
    /// Items found in more than one category, each with `detected_in` set.
    pub conflicts: Vec<Item>,
}

impl ConflictReport {
    /// Unique items for `category`; empty when it was not an input.
    #[must_use]
    pub fn unique_for(&self, category: &str) -> &[Item] {
        self.unique
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, items)| items.as_slice())
            .unwrap_or_default()
    }
}

impl Serialize for ConflictReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.unique.len() + 1))?;
        for (category, items) in &self.unique {
            map.serialize_entry(category, items)?;
        }
        map.serialize_entry(CONFLICTS_KEY, &self.conflicts)?;
        map.end()
    }
}

/// One registered name: its first-seen item and the categories it was
/// found in, in encounter order.
struct Registration {
    canonical: Item,
    categories: Vec<String>,
}

/// Partitions `stores` (category name, items) in the order given.
///
/// # Errors
///
/// Returns [`ResolveError`] if fewer than two categories are given, a
/// category repeats, or a category is named `conflicts`.
pub fn resolve(stores: &[(String, Vec<Item>)]) -> Result<ConflictReport, ResolveError> {
    let categories: Vec<&str> = stores.iter().map(|(c, _)| c.as_str()).collect();
    validate(&categories)?;

    let mut order: Vec<String> = Vec::new();
    let mut registry: HashMap<String, Registration> = HashMap::new();

    for (category, items) in stores {
        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                tracing::warn!(category = %category, "skipping item with blank name");
                continue;
            }
            let entry = registry.entry(name.to_string()).or_insert_with(|| {
                order.push(name.to_string());
                Registration {
                    canonical: item.clone(),
                    categories: Vec::new(),
                }
            });
            if !entry.categories.iter().any(|c| c == category) {
                entry.categories.push(category.clone());
            }
        }
    }

    let mut report = ConflictReport {
        unique: stores.iter().map(|(c, _)| (c.clone(), Vec::new())).collect(),
        conflicts: Vec::new(),
    };

    for name in order {
        let Some(Registration {
            mut canonical,
            categories,
        }) = registry.remove(&name)
        else {
            continue;
        };

        if let [only] = categories.as_slice() {
            if let Some((_, bucket)) = report.unique.iter_mut().find(|(c, _)| c == only) {
                bucket.push(canonical);
            }
        } else {
            tracing::warn!(name = %name, categories = ?categories, "name found in several categories");
            canonical.detected_in = Some(categories);
            report.conflicts.push(canonical);
        }
    }

    Ok(report)
}

/// Loads each category's store from `store` and resolves them.
///
/// # Errors
///
/// Returns [`ResolveError`] for invalid category lists. Missing or corrupt
/// store files count as empty, as they do for merging.
pub fn load_and_resolve(
    store: &JsonStore,
    categories: &[String],
) -> Result<ConflictReport, ResolveError> {
    let names: Vec<&str> = categories.iter().map(String::as_str).collect();
    validate(&names)?;

    let stores: Vec<(String, Vec<Item>)> = categories
        .iter()
        .map(|category| {
            if !store.path_for(category).exists() {
                tracing::warn!(category = %category, "store file not found; treating as empty");
            }
            (category.clone(), store.load(category).items)
        })
        .collect();

    resolve(&stores)
}

/// Writes `report` as 4-space-indented JSON, replacing any previous report.
///
/// # Errors
///
/// Returns [`StoreError`] if the report cannot be serialized or written.
pub fn write_report(path: &Path, report: &ConflictReport) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    write_json_atomic(path, report)
}

fn validate(categories: &[&str]) -> Result<(), ResolveError> {
    if categories.len() < 2 {
        return Err(ResolveError::TooFewCategories {
            found: categories.len(),
        });
    }
    let mut seen = HashSet::new();
    for &category in categories {
        if category == CONFLICTS_KEY {
            return Err(ResolveError::ReservedCategory(category.to_string()));
        }
        if !seen.insert(category) {
            return Err(ResolveError::DuplicateCategory(category.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "conflicts_test.rs"]
mod tests;
