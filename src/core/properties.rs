//! `library.properties` metadata.
//!
//! Every installed library may ship a `library.properties` file of
//! `key=value` lines describing it. Known keys map onto typed fields; anything
//! else is kept, in file order, in [`LibraryProperties::extra`].

use std::path::Path;

use anyhow::{bail, Context, Result};

/// File name of the per-library metadata file.
pub const PROPERTIES_FILE: &str = "library.properties";

/// Parsed contents of a `library.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryProperties {
    pub name: String,
    pub version: Option<String>,
    pub author: Option<String>,
    pub maintainer: Option<String>,
    pub sentence: Option<String>,
    pub paragraph: Option<String>,
    pub category: Option<String>,
    /// The library's website (`url` key).
    pub url: Option<String>,
    pub architectures: Vec<String>,
    /// Unrecognized keys.
    pub extra: Vec<(String, String)>,
}

impl LibraryProperties {
    /// Parse properties text.
    ///
    /// Fails only when no non-empty `name` is present.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut props = LibraryProperties::default();
        let mut name = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::trace!("ignoring properties line without '=': {}", line);
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "name" => name = Some(value.to_string()),
                "version" => props.version = non_empty(value),
                "author" => props.author = non_empty(value),
                "maintainer" => props.maintainer = non_empty(value),
                "sentence" => props.sentence = non_empty(value),
                "paragraph" => props.paragraph = non_empty(value),
                "category" => props.category = non_empty(value),
                "url" => props.url = non_empty(value),
                "architectures" => props.architectures = split_list(value),
                _ => props.extra.push((key.to_string(), value.to_string())),
            }
        }

        match name {
            Some(name) if !name.is_empty() => props.name = name,
            _ => bail!("library.properties has no `name`"),
        }

        Ok(props)
    }

    /// Read and parse a properties file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = crate::util::fs::read_to_string(path)?;
        Self::parse(&contents).with_context(|| format!("invalid {}", path.display()))
    }

    /// Look up an unrecognized key.
    pub fn get_extra(&self, key: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pad a version string to at least three dot-separated components.
///
/// `"1"` becomes `"1.0.0"` and `"1.2"` becomes `"1.2.0"`; an empty string
/// stays empty.
pub fn format_version(version: &str) -> String {
    let version = version.trim();
    if version.is_empty() {
        return String::new();
    }

    let mut parts: Vec<&str> = version.split('.').collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    parts.join(".")
}
