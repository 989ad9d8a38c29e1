//! Library records and the catalog they are merged into.
//!
//! A [`LibraryRecord`] is the unit every source contributes to: the index
//! seeds records with known versions, the filesystem scans mark them
//! installed, and the tagging pass decides whether the selected board can use
//! them. Within one load, records are keyed by their normalized name in a
//! [`Catalog`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::properties::{format_version, LibraryProperties};

/// Character that replaces whitespace runs in normalized names.
pub const NAME_JOIN_CHAR: &str = "_";

/// Category tag for libraries found on disk without any metadata.
pub const CONTRIBUTED_TYPE: &str = "Contributed";

/// Conventional source subdirectory of an installed library.
pub const SOURCE_DIR: &str = "src";

/// Architecture token matching every architecture.
pub const WILDCARD_ARCH: &str = "*";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run in `name` to [`NAME_JOIN_CHAR`].
///
/// Installers apply the same rule to library folder names, which is what
/// lets index entries and installed folders be joined by name.
pub fn normalize_name(name: &str) -> String {
    WHITESPACE.replace_all(name, NAME_JOIN_CHAR).into_owned()
}

/// One library as known to the current load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
    /// Display name. Board-package libraries may carry an `(arch)` suffix.
    pub name: String,

    /// Versions offered by the index, in first-encounter order.
    #[serde(default)]
    pub versions: Vec<String>,

    /// Version found on disk.
    pub installed_version: Option<String>,

    /// Sourced from a bundled or board-package root rather than the sketchbook.
    #[serde(default)]
    pub built_in: bool,

    #[serde(default)]
    pub installed: bool,

    pub installed_path: Option<PathBuf>,

    /// `src/` under the install path when present, else the install path.
    #[serde(rename = "srcPath")]
    pub source_path: Option<PathBuf>,

    /// Declared architectures; empty means all.
    #[serde(default)]
    pub architectures: Vec<String>,

    /// Usable on the selected board. `None` until tagged.
    pub supported: Option<bool>,

    #[serde(default)]
    pub types: Vec<String>,

    pub author: Option<String>,
    pub maintainer: Option<String>,
    pub sentence: Option<String>,
    pub paragraph: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
}

impl LibraryRecord {
    /// Create an empty record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        LibraryRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a record for an installed folder that has no metadata file.
    pub fn contributed(folder_name: impl Into<String>) -> Self {
        LibraryRecord {
            types: vec![CONTRIBUTED_TYPE.to_string()],
            ..LibraryRecord::new(folder_name)
        }
    }

    /// Create a record from parsed `library.properties`.
    pub fn from_properties(props: &LibraryProperties) -> Self {
        LibraryRecord {
            name: props.name.clone(),
            installed_version: props.version.as_deref().map(format_version),
            architectures: props.architectures.clone(),
            author: props.author.clone(),
            maintainer: props.maintainer.clone(),
            sentence: props.sentence.clone(),
            paragraph: props.paragraph.clone(),
            website: props.url.clone(),
            category: props.category.clone(),
            ..Default::default()
        }
    }

    /// Record the on-disk installation at `install_dir`.
    pub fn mark_installed(&mut self, install_dir: &Path, built_in: bool) {
        let src = install_dir.join(SOURCE_DIR);

        self.built_in = built_in;
        self.installed = true;
        self.installed_path = Some(install_dir.to_path_buf());
        self.source_path = Some(if src.is_dir() {
            src
        } else {
            install_dir.to_path_buf()
        });
    }

    /// The normalized form of this record's name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Case-insensitive match against the display or normalized name.
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self.normalized_name().eq_ignore_ascii_case(&normalize_name(query))
    }

    /// Architectures used for compatibility checks; empty means wildcard.
    pub fn effective_architectures(&self) -> Vec<&str> {
        if self.architectures.is_empty() {
            vec![WILDCARD_ARCH]
        } else {
            self.architectures.iter().map(String::as_str).collect()
        }
    }

    /// Newest version offered by the index.
    ///
    /// Versions that are not valid semver after padding are skipped; if none
    /// parse, the last listed version is returned.
    pub fn latest_version(&self) -> Option<&str> {
        self.versions
            .iter()
            .filter_map(|v| parse_version(v).map(|parsed| (parsed, v.as_str())))
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, v)| v)
            .or_else(|| self.versions.last().map(String::as_str))
    }

    /// Whether the index offers a newer version than the one installed.
    ///
    /// Built-in libraries are updated with their bundle, never individually.
    pub fn update_available(&self) -> bool {
        if !self.installed || self.built_in {
            return false;
        }

        let installed = self.installed_version.as_deref().and_then(parse_version);
        let latest = self.latest_version().and_then(parse_version);

        matches!((installed, latest), (Some(installed), Some(latest)) if latest > installed)
    }
}

/// Parse a possibly short version string (`"1.2"`) as semver.
pub fn parse_version(version: &str) -> Option<Version> {
    Version::parse(&format_version(version)).ok()
}

/// Records of one load, keyed by normalized name.
///
/// Iteration and [`Catalog::into_records`] follow first-insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<LibraryRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by key.
    pub fn get(&self, key: &str) -> Option<&LibraryRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Look up a record by key for mutation.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut LibraryRecord> {
        self.index.get(key).map(|&i| &mut self.records[i])
    }

    /// Return the record stored under `key`, inserting `create()` if absent.
    pub fn upsert_with(
        &mut self,
        key: &str,
        create: impl FnOnce() -> LibraryRecord,
    ) -> &mut LibraryRecord {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.records.push(create());
                let i = self.records.len() - 1;
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.records[i]
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut keys: Vec<(&str, usize)> =
            self.index.iter().map(|(k, &i)| (k.as_str(), i)).collect();
        keys.sort_by_key(|&(_, i)| i);
        keys.into_iter().map(|(k, _)| k)
    }

    /// Flatten into the record list.
    pub fn into_records(self) -> Vec<LibraryRecord> {
        self.records
    }
}
