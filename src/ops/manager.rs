//! Published library state.
//!
//! [`LibraryManager`] owns the collaborators a load needs and the last
//! successfully loaded record list. Readers get an `Arc` snapshot that stays
//! valid, if stale, across later reloads.

use std::sync::{Arc, RwLock};

use crate::core::board::BoardRegistry;
use crate::core::library::LibraryRecord;
use crate::ops::errors::LoadError;
use crate::ops::load::{load_libraries, LibrarySettings};
use crate::ops::tag::tag_supported;
use crate::sources::fetch::IndexFetcher;

/// Loads libraries and publishes the result.
///
/// Reloads are not coordinated here; callers should run at most one
/// [`LibraryManager::load_libraries`] at a time.
pub struct LibraryManager {
    settings: LibrarySettings,
    boards: Arc<dyn BoardRegistry>,
    fetcher: Box<dyn IndexFetcher>,
    published: RwLock<Arc<[LibraryRecord]>>,
}

impl LibraryManager {
    /// Create a manager with nothing published yet.
    ///
    /// The board registry is shared so callers can keep changing the
    /// selected board and then call [`LibraryManager::on_board_changed`].
    pub fn new(
        settings: LibrarySettings,
        boards: Arc<dyn BoardRegistry>,
        fetcher: Box<dyn IndexFetcher>,
    ) -> Self {
        LibraryManager {
            settings,
            boards,
            fetcher,
            published: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// The board registry this manager tags against.
    pub fn boards(&self) -> &dyn BoardRegistry {
        self.boards.as_ref()
    }

    /// Rebuild the library list, refreshing the index first if `update`.
    ///
    /// On failure the previously published list is kept.
    pub fn load_libraries(&self, update: bool) -> Result<Arc<[LibraryRecord]>, LoadError> {
        let records = load_libraries(
            &self.settings,
            self.boards.as_ref(),
            self.fetcher.as_ref(),
            update,
        )?;

        Ok(self.publish(records))
    }

    /// The last published list; empty before the first successful load.
    pub fn libraries(&self) -> Arc<[LibraryRecord]> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Retag the published list against the currently selected board.
    ///
    /// Call whenever the board selection changes; nothing is rescanned.
    pub fn on_board_changed(&self) -> Arc<[LibraryRecord]> {
        let board = self.boards.current_board();
        let mut records = self.libraries().to_vec();
        tag_supported(&mut records, board.as_ref().map(|b| b.architecture.as_str()));
        self.publish(records)
    }

    /// Find a published library by display or normalized name.
    pub fn find(&self, name: &str) -> Option<LibraryRecord> {
        self.libraries()
            .iter()
            .find(|r| r.matches_name(name))
            .cloned()
    }

    fn publish(&self, records: Vec<LibraryRecord>) -> Arc<[LibraryRecord]> {
        let snapshot: Arc<[LibraryRecord]> = Arc::from(records);
        let mut published = self.published.write().unwrap_or_else(|e| e.into_inner());
        *published = Arc::clone(&snapshot);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::{Board, FsBoardRegistry};
    use crate::core::properties::PROPERTIES_FILE;
    use crate::sources::fetch::OfflineFetcher;
    use tempfile::TempDir;

    const INDEX_JSON: &str = r#"{
  "libraries": [
    { "name": "Servo", "version": "1.1.7", "architectures": ["avr", "sam"] },
    { "name": "ESP Async", "version": "0.1.0", "architectures": ["esp32"] }
  ]
}"#;

    fn setup(tmp: &TempDir) -> (LibraryManager, Arc<FsBoardRegistry>) {
        let settings = LibrarySettings {
            package_path: tmp.path().join("pkgs"),
            default_library_path: None,
            sketchbook_path: tmp.path().join("sketchbook"),
        };
        std::fs::create_dir_all(&settings.package_path).unwrap();
        std::fs::write(settings.index_path(), INDEX_JSON).unwrap();

        let boards = Arc::new(
            FsBoardRegistry::new(&settings.package_path)
                .with_board(Some(Board::from_fqbn("arduino:avr:uno").unwrap())),
        );

        let manager = LibraryManager::new(settings, boards.clone(), Box::new(OfflineFetcher));
        (manager, boards)
    }

    #[test]
    fn test_empty_before_first_load() {
        let tmp = TempDir::new().unwrap();
        let (manager, _) = setup(&tmp);
        assert!(manager.libraries().is_empty());
        assert!(manager.find("Servo").is_none());
    }

    #[test]
    fn test_load_publishes_snapshot() {
        let tmp = TempDir::new().unwrap();
        let (manager, _) = setup(&tmp);

        let loaded = manager.load_libraries(false).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(manager.libraries().len(), 2);
        assert_eq!(manager.find("esp_async").unwrap().name, "ESP Async");
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let (manager, _) = setup(&tmp);
        let before = manager.load_libraries(false).unwrap();

        std::fs::write(manager.settings().index_path(), "garbage").unwrap();
        assert!(manager.load_libraries(false).is_err());

        let after = manager.libraries();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_readers_keep_stale_snapshot() {
        let tmp = TempDir::new().unwrap();
        let (manager, _) = setup(&tmp);
        let old = manager.load_libraries(false).unwrap();

        let lib = manager.settings().sketchbook_libraries().join("Extra");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join(PROPERTIES_FILE), "name=Extra\nversion=1.0\n").unwrap();
        let new = manager.load_libraries(false).unwrap();

        assert_eq!(old.len(), 2);
        assert_eq!(new.len(), 3);
    }

    #[test]
    fn test_board_change_retags_without_rescan() {
        let tmp = TempDir::new().unwrap();
        let (manager, boards) = setup(&tmp);
        manager.load_libraries(false).unwrap();
        assert_eq!(manager.find("ESP Async").unwrap().supported, Some(false));
        assert_eq!(manager.find("Servo").unwrap().supported, Some(true));

        // Nothing may be reread from disk.
        std::fs::remove_file(manager.settings().index_path()).unwrap();

        boards.select_board(Some(Board::from_fqbn("esp32:esp32:devkit").unwrap()));
        let retagged = manager.on_board_changed();

        assert_eq!(retagged.len(), 2);
        assert_eq!(manager.find("ESP Async").unwrap().supported, Some(true));
        assert_eq!(manager.find("Servo").unwrap().supported, Some(false));
    }

    #[test]
    fn test_deselecting_board_keeps_tags() {
        let tmp = TempDir::new().unwrap();
        let (manager, boards) = setup(&tmp);
        manager.load_libraries(false).unwrap();

        boards.select_board(None);
        manager.on_board_changed();

        assert_eq!(manager.find("ESP Async").unwrap().supported, Some(false));
    }
}
