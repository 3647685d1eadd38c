//! Per-category item files, deduplicated by name and append-only.
//!
//! Each category lives in `<data_dir>/<category>_data.json` as a
//! JSON array indented by four spaces. Every merge rewrites the whole file through a
//! sibling temp file, so a crash mid-write leaves the previous version intact.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use harvest_core::Item;
use serde::Serialize;

use crate::error::StoreError;

/// Items read from a store file.
#[derive(Debug, Default)]
pub struct LoadedStore {
    pub items: Vec<Item>,
    /// Set when the file existed but could not be read or parsed and the
    /// store was treated as empty.
    pub recovered: Option<StoreError>,
}

#[derive(Debug)]
pub struct MergeOutcome {
    /// Items appended by this merge.
    pub added: usize,
    /// Items in the store after the merge.
    pub total: usize,
    pub recovered: Option<StoreError>,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn path_for(&self, category: &str) -> PathBuf {
        self.data_dir.join(format!("{category}_data.json"))
    }

    /// Reads the store for `category`. A missing file is an empty store; an
    /// unreadable or corrupt one is also empty, with the cause in
    /// [`LoadedStore::recovered`].
    #[must_use]
    pub fn load(&self, category: &str) -> LoadedStore {
        let path = self.path_for(category);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LoadedStore::default(),
            Err(e) => return recovered(category, StoreError::Io { path, source: e }),
        };

        match serde_json::from_slice::<Vec<Item>>(&bytes) {
            Ok(items) => LoadedStore {
                items,
                recovered: None,
            },
            Err(e) => recovered(category, StoreError::Corrupt { path, source: e }),
        }
    }

    /// Appends every item whose name is not yet in the store, in order, and
    /// rewrites the file. Duplicates within `new_items` collapse to the first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated store cannot be written. Load
    /// failures are not errors; see [`MergeOutcome::recovered`].
    pub fn merge(&self, category: &str, new_items: Vec<Item>) -> Result<MergeOutcome, StoreError> {
        let LoadedStore {
            mut items,
            recovered,
        } = self.load(category);

        let mut seen: HashSet<String> = items.iter().map(|item| item.name.clone()).collect();
        let before = items.len();
        for item in new_items {
            if seen.insert(item.name.clone()) {
                items.push(item);
            }
        }
        let added = items.len() - before;

        self.write(&self.path_for(category), &items)?;

        tracing::info!(
            category,
            added,
            total = items.len(),
            "added new unique items"
        );

        Ok(MergeOutcome {
            added,
            total: items.len(),
            recovered,
        })
    }

    fn write(&self, path: &Path, items: &[Item]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Io {
            path: self.data_dir.clone(),
            source: e,
        })?;
        write_json_atomic(path, items)
    }
}

/// Serializes `value` as 4-space-indented JSON into a sibling temp file and
/// renames it over `path`.
pub(crate) fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| StoreError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn recovered(category: &str, error: StoreError) -> LoadedStore {
    tracing::warn!(category, error = %error, "store unreadable; starting from empty");
    LoadedStore {
        items: Vec::new(),
        recovered: Some(error),
    }
}
