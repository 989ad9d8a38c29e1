//! Library sources.
//!
//! Sources feed the load pipeline: the downloaded library index and the
//! library folders installed on disk.

pub mod fetch;
pub mod index;
pub mod scan;

pub use fetch::{HttpIndexFetcher, IndexFetcher, OfflineFetcher};
pub use index::{read_index, seed_catalog, LibraryIndex, INDEX_FILE};
pub use scan::{scan_board_libraries, scan_installed_platforms, scan_library_root};
