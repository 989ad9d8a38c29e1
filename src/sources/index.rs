//! Library index loading.
//!
//! The index (`library_index.json`) lists every published library release as
//! its own entry. Loading folds those entries into one record per normalized
//! name, accumulating the versions.

use std::path::Path;

use serde::Deserialize;

use crate::core::library::{normalize_name, Catalog, LibraryRecord};
use crate::ops::errors::LoadError;

/// File name of the library index inside the package directory.
pub const INDEX_FILE: &str = "library_index.json";

/// The library index document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryIndex {
    #[serde(default)]
    pub libraries: Vec<IndexEntry>,
}

/// One library release listed in the index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub paragraph: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub architectures: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl IndexEntry {
    fn into_record(self) -> LibraryRecord {
        LibraryRecord {
            name: self.name,
            versions: vec![self.version],
            built_in: false,
            installed_version: None,
            author: self.author,
            maintainer: self.maintainer,
            sentence: self.sentence,
            paragraph: self.paragraph,
            website: self.website,
            category: self.category,
            architectures: self.architectures,
            types: self.types,
            ..Default::default()
        }
    }
}

/// Read and parse the index at `path`.
pub fn read_index(path: &Path) -> Result<LibraryIndex, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::ReadIndex {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| LoadError::ParseIndex {
        path: path.to_path_buf(),
        source,
    })
}

/// Fold index entries into a fresh catalog.
///
/// The first entry for a normalized name supplies the record's metadata;
/// later entries only contribute their version. A version already listed for
/// that name is not repeated.
pub fn seed_catalog(index: LibraryIndex) -> Catalog {
    let mut catalog = Catalog::new();

    for entry in index.libraries {
        let key = normalize_name(&entry.name);

        match catalog.get_mut(&key) {
            Some(existing) => {
                if !existing.versions.contains(&entry.version) {
                    existing.versions.push(entry.version);
                }
            }
            None => {
                catalog.upsert_with(&key, || entry.into_record());
            }
        }
    }

    tracing::debug!("index provided {} libraries", catalog.len());
    catalog
}
