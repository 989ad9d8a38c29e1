//! The library load pipeline.
//!
//! A load rebuilds the full record list from scratch:
//!
//! 1. Fetch the index if asked to, or if it is missing, then read it.
//! 2. Merge libraries bundled with the IDE installation.
//! 3. Merge libraries from the sketchbook.
//! 4. Collect libraries bundled with each installed platform.
//! 5. Flatten, append the platform libraries, and tag board compatibility.

use std::path::PathBuf;

use crate::core::board::BoardRegistry;
use crate::core::library::LibraryRecord;
use crate::ops::errors::LoadError;
use crate::ops::tag::tag_supported;
use crate::sources::fetch::IndexFetcher;
use crate::sources::index::{read_index, seed_catalog, INDEX_FILE};
use crate::sources::scan::{scan_installed_platforms, scan_library_root};

/// Where libraries live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySettings {
    /// Holds the library index and installed board packages
    pub package_path: PathBuf,

    /// Libraries bundled with the IDE installation, if any
    pub default_library_path: Option<PathBuf>,

    /// Sketchbook root
    pub sketchbook_path: PathBuf,
}

impl LibrarySettings {
    /// Path of the library index file.
    pub fn index_path(&self) -> PathBuf {
        self.package_path.join(INDEX_FILE)
    }

    /// Root of user-installed libraries.
    pub fn sketchbook_libraries(&self) -> PathBuf {
        self.sketchbook_path.join("libraries")
    }
}

/// Run the full pipeline and return the tagged record list.
///
/// Fails only when the index cannot be fetched, read, or parsed.
pub fn load_libraries(
    settings: &LibrarySettings,
    boards: &dyn BoardRegistry,
    fetcher: &dyn IndexFetcher,
    update: bool,
) -> Result<Vec<LibraryRecord>, LoadError> {
    let index_path = settings.index_path();

    if update || !index_path.is_file() {
        fetcher
            .fetch(&index_path)
            .map_err(|e| LoadError::Fetch {
                path: index_path.clone(),
                source: e.into(),
            })?;
    }

    let mut catalog = seed_catalog(read_index(&index_path)?);

    if let Some(default_libs) = &settings.default_library_path {
        let count = scan_library_root(&mut catalog, default_libs, true);
        tracing::debug!("{} bundled libraries in {}", count, default_libs.display());
    }

    let sketchbook_libs = settings.sketchbook_libraries();
    let count = scan_library_root(&mut catalog, &sketchbook_libs, false);
    tracing::debug!("{} sketchbook libraries in {}", count, sketchbook_libs.display());

    let platforms = boards.installed_platforms().unwrap_or_else(|e| {
        tracing::warn!("failed to list installed platforms: {:#}", e);
        Vec::new()
    });
    let board_libs = scan_installed_platforms(&catalog, &platforms);

    let mut records = catalog.into_records();
    records.extend(board_libs);

    let board = boards.current_board();
    tag_supported(&mut records, board.as_ref().map(|b| b.architecture.as_str()));

    tracing::info!(
        "Loaded {} libraries ({} installed)",
        records.len(),
        records.iter().filter(|r| r.installed).count()
    );

    Ok(records)
}
