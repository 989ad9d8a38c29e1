//! Configuration file support for libdock.
//!
//! libdock supports two configuration file locations:
//! - Global: `<libdock home>/config.toml` - User-wide defaults
//! - Project: `.libdock/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default URL of the compressed library index.
pub const DEFAULT_INDEX_URL: &str = "https://downloads.arduino.cc/libraries/library_index.json.gz";

/// Default timeout for index downloads, in seconds.
pub const DEFAULT_NET_TIMEOUT: u64 = 60;

/// libdock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library and package locations
    pub paths: PathsConfig,

    /// Selected board
    pub board: BoardConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `library_index.json` and installed board packages
    pub package_path: Option<PathBuf>,

    /// Bundled libraries shipped with the IDE installation
    pub default_libraries: Option<PathBuf>,

    /// Sketchbook root (libraries live in `<sketchbook>/libraries`)
    pub sketchbook: Option<PathBuf>,
}

/// Board selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Fully qualified board name, e.g. `arduino:avr:uno`
    pub fqbn: Option<String>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Library index download URL
    pub index_url: Option<String>,

    /// Download timeout in seconds
    pub timeout: Option<u64>,

    /// Offline mode (never download the index)
    #[serde(default)]
    pub offline: bool,
}

impl NetConfig {
    /// The configured index URL, or the default one.
    pub fn index_url(&self) -> &str {
        self.index_url.as_deref().unwrap_or(DEFAULT_INDEX_URL)
    }

    /// The configured timeout, or the default one.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_NET_TIMEOUT)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.paths.package_path.is_some() {
            self.paths.package_path = other.paths.package_path;
        }
        if other.paths.default_libraries.is_some() {
            self.paths.default_libraries = other.paths.default_libraries;
        }
        if other.paths.sketchbook.is_some() {
            self.paths.sketchbook = other.paths.sketchbook;
        }

        if other.board.fqbn.is_some() {
            self.board.fqbn = other.board.fqbn;
        }

        if other.net.index_url.is_some() {
            self.net.index_url = other.net.index_url;
        }
        if other.net.timeout.is_some() {
            self.net.timeout = other.net.timeout;
        }
        if other.net.offline {
            self.net.offline = true;
        }
    }

    /// Resolve relative configured paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p.as_mut() {
                let expanded = crate::util::fs::expand_home(path);
                *path = if expanded.is_relative() {
                    base.join(expanded)
                } else {
                    expanded
                };
            }
        };

        resolve(&mut self.paths.package_path);
        resolve(&mut self.paths.default_libraries);
        resolve(&mut self.paths.sketchbook);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.libdock/config.toml)
/// 2. Global config (<libdock home>/config.toml)
/// 3. Defaults
///
/// Relative paths in the project config are resolved against `project_root`.
pub fn load_config(global_path: &Path, project_path: &Path, project_root: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let mut global = Config::load_or_default(global_path);
        let global_dir = global_path.parent().unwrap_or(project_root);
        global.resolve_paths(global_dir);
        config.merge(global);
    }

    if project_path.exists() {
        let mut project = Config::load_or_default(project_path);
        project.resolve_paths(project_root);
        config.merge(project);
    }

    config
}

/// Default package directory used by the IDE tooling.
pub fn default_package_path() -> PathBuf {
    let Some(base) = directories::BaseDirs::new() else {
        return PathBuf::from(".arduino15");
    };

    if cfg!(target_os = "macos") {
        base.home_dir().join("Library").join("Arduino15")
    } else if cfg!(windows) {
        base.data_local_dir().join("Arduino15")
    } else {
        base.home_dir().join(".arduino15")
    }
}

/// Default sketchbook directory.
pub fn default_sketchbook_path() -> PathBuf {
    if cfg!(any(target_os = "macos", windows)) {
        if let Some(docs) = directories::UserDirs::new()
            .as_ref()
            .and_then(|u| u.document_dir())
        {
            return docs.join("Arduino");
        }
    }

    directories::BaseDirs::new()
        .map(|b| b.home_dir().join("Arduino"))
        .unwrap_or_else(|| PathBuf::from("Arduino"))
}
