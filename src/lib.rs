//! libdock - An Arduino library catalog
//!
//! This crate builds the list of Arduino libraries a user can see: every
//! library from the downloaded index, merged with the libraries installed in
//! the IDE, the sketchbook, and each installed board package, tagged with
//! compatibility for the selected board.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

pub use core::{
    board::{Board, BoardRegistry, FsBoardRegistry, Platform},
    library::{normalize_name, LibraryRecord},
};

pub use ops::{LibraryManager, LibrarySettings, LoadError};
pub use util::context::GlobalContext;
