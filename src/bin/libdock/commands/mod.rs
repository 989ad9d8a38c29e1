//! Command implementations

pub mod completions;
pub mod list;
pub mod show;
pub mod update;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use libdock::core::Board;
use libdock::sources::{HttpIndexFetcher, IndexFetcher, OfflineFetcher};
use libdock::util::GlobalContext;
use libdock::{FsBoardRegistry, LibraryManager};

use crate::cli::GlobalArgs;

/// Everything a command needs to load libraries.
pub struct Session {
    pub manager: LibraryManager,
}

impl Session {
    /// Build a session from the config files and global flags.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let ctx = GlobalContext::new()?;

        let config = ctx.load_config();
        let settings = ctx.library_settings(&config);

        let board = match global.board.as_deref().or(config.board.fqbn.as_deref()) {
            Some(fqbn) => Some(Board::from_fqbn(fqbn)?),
            None => None,
        };

        let boards = FsBoardRegistry::new(&settings.package_path)
            .with_sketchbook(&settings.sketchbook_path)
            .with_board(board);

        let fetcher: Box<dyn IndexFetcher> = if config.net.offline {
            Box::new(OfflineFetcher)
        } else {
            Box::new(HttpIndexFetcher::new(
                config.net.index_url(),
                Duration::from_secs(config.net.timeout_secs()),
            )?)
        };

        tracing::debug!("package path: {}", settings.package_path.display());
        tracing::debug!("sketchbook: {}", settings.sketchbook_path.display());

        let manager = LibraryManager::new(settings, Arc::new(boards), fetcher);
        Ok(Session { manager })
    }

    /// Whether a board is selected.
    pub fn has_board(&self) -> bool {
        self.manager.boards().current_board().is_some()
    }
}
