//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Entry names that are never libraries or platforms.
const JUNK_NAMES: &[&str] = &[
    "Thumbs.db",
    "desktop.ini",
    "__MACOSX",
    "$RECYCLE.BIN",
    "System Volume Information",
];

/// Check whether a directory entry name is OS or editor junk.
///
/// Hidden dotfiles count as junk.
pub fn is_junk(name: &str) -> bool {
    name.starts_with('.') || JUNK_NAMES.iter().any(|junk| junk.eq_ignore_ascii_case(name))
}

/// List the immediate, non-junk subdirectories of `root`, sorted by file name.
///
/// A missing root yields an empty list. Only failing to read `root` itself is
/// an error; entries that cannot be inspected, such as dangling symlinks, are
/// skipped.
pub fn list_subdirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e)
                    .with_context(|| format!("failed to read directory: {}", root.display()));
            }
            Err(e) => {
                tracing::debug!("skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_junk(&name) {
            continue;
        }

        dirs.push(entry.into_path());
    }

    Ok(dirs)
}

/// Name of the last path component, lossily converted.
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
