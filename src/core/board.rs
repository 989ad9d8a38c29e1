//! Boards and installed board packages.
//!
//! A [`Board`] is the currently selected target; a [`Platform`] is one
//! installed board package (one vendor architecture) that may bundle its own
//! libraries. The [`BoardRegistry`] trait is how the library pipeline learns
//! about both.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

use anyhow::{bail, Result};

use crate::core::library::parse_version;
use crate::util::fs::{dir_name, list_subdirs};

/// A selectable board, identified by its fully qualified board name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Package vendor, e.g. `arduino`
    pub vendor: String,
    /// Architecture, e.g. `avr`
    pub architecture: String,
    /// Board id within the platform, e.g. `uno`
    pub id: String,
    /// Menu options following the board id, verbatim
    pub options: Option<String>,
}

impl Board {
    /// Parse an FQBN of the form `vendor:arch:board[:options]`.
    pub fn from_fqbn(fqbn: &str) -> Result<Self> {
        let mut parts = fqbn.splitn(4, ':');
        let vendor = parts.next().unwrap_or_default().trim();
        let architecture = parts.next().unwrap_or_default().trim();
        let id = parts.next().unwrap_or_default().trim();
        let options = parts.next().map(|o| o.to_string());

        if vendor.is_empty() || architecture.is_empty() || id.is_empty() {
            bail!(
                "invalid board `{}`: expected `vendor:architecture:board`",
                fqbn
            );
        }

        Ok(Board {
            vendor: vendor.to_string(),
            architecture: architecture.to_string(),
            id: id.to_string(),
            options,
        })
    }

    /// The board's FQBN.
    pub fn fqbn(&self) -> String {
        match &self.options {
            Some(options) => format!("{}:{}:{}:{}", self.vendor, self.architecture, self.id, options),
            None => format!("{}:{}:{}", self.vendor, self.architecture, self.id),
        }
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Board::from_fqbn(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqbn())
    }
}

/// An installed board package for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub vendor: String,
    pub architecture: String,
    /// Installed version, if the layout records one
    pub version: Option<String>,
    /// Platform root; bundled libraries live in `<root>/libraries`
    pub root_path: PathBuf,
}

impl Platform {
    /// Directory holding this platform's bundled libraries.
    pub fn libraries_path(&self) -> PathBuf {
        self.root_path.join("libraries")
    }
}

/// Source of installed platforms and the selected board.
pub trait BoardRegistry: Send + Sync {
    /// Installed platforms, in the order their libraries should be scanned.
    fn installed_platforms(&self) -> Result<Vec<Platform>>;

    /// The currently selected board, if any.
    fn current_board(&self) -> Option<Board>;
}

/// Board registry backed by the on-disk package layout.
///
/// Platforms are discovered under
/// `<package_path>/packages/<vendor>/hardware/<arch>/<version>/` (newest
/// version wins) and then `<sketchbook>/hardware/<vendor>/<arch>/`.
#[derive(Debug)]
pub struct FsBoardRegistry {
    package_path: PathBuf,
    sketchbook_path: Option<PathBuf>,
    current: RwLock<Option<Board>>,
}

impl FsBoardRegistry {
    /// Create a registry over a package directory.
    pub fn new(package_path: impl Into<PathBuf>) -> Self {
        FsBoardRegistry {
            package_path: package_path.into(),
            sketchbook_path: None,
            current: RwLock::new(None),
        }
    }

    /// Also discover manually installed platforms in a sketchbook.
    pub fn with_sketchbook(mut self, sketchbook: impl Into<PathBuf>) -> Self {
        self.sketchbook_path = Some(sketchbook.into());
        self
    }

    /// Start with a board selected.
    pub fn with_board(self, board: Option<Board>) -> Self {
        self.select_board(board);
        self
    }

    /// Change the selected board.
    pub fn select_board(&self, board: Option<Board>) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = board;
    }

    fn packaged_platforms(&self) -> Result<Vec<Platform>> {
        let mut platforms = Vec::new();

        for vendor_dir in list_subdirs(&self.package_path.join("packages"))? {
            let vendor = dir_name(&vendor_dir);

            for arch_dir in list_subdirs(&vendor_dir.join("hardware"))? {
                let Some((version, root)) = newest_version_dir(&arch_dir)? else {
                    continue;
                };

                platforms.push(Platform {
                    vendor: vendor.clone(),
                    architecture: dir_name(&arch_dir),
                    version: Some(version),
                    root_path: root,
                });
            }
        }

        Ok(platforms)
    }

    fn sketchbook_platforms(&self) -> Result<Vec<Platform>> {
        let Some(sketchbook) = &self.sketchbook_path else {
            return Ok(Vec::new());
        };

        let mut platforms = Vec::new();
        for vendor_dir in list_subdirs(&sketchbook.join("hardware"))? {
            let vendor = dir_name(&vendor_dir);
            for arch_dir in list_subdirs(&vendor_dir)? {
                platforms.push(Platform {
                    vendor: vendor.clone(),
                    architecture: dir_name(&arch_dir),
                    version: None,
                    root_path: arch_dir,
                });
            }
        }

        Ok(platforms)
    }
}

impl BoardRegistry for FsBoardRegistry {
    fn installed_platforms(&self) -> Result<Vec<Platform>> {
        let mut platforms = self.packaged_platforms()?;
        platforms.extend(self.sketchbook_platforms()?);
        Ok(platforms)
    }

    fn current_board(&self) -> Option<Board> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Pick the newest version directory under an architecture directory.
fn newest_version_dir(arch_dir: &Path) -> Result<Option<(String, PathBuf)>> {
    let newest = list_subdirs(arch_dir)?
        .into_iter()
        .map(|dir| (dir_name(&dir), dir))
        .max_by(|(a, _), (b, _)| match (parse_version(a), parse_version(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => a.cmp(b),
        });

    Ok(newest)
}
