//! Core data structures for libdock.
//!
//! This module contains the foundational types used throughout libdock:
//! - Library records and the per-load catalog
//! - `library.properties` metadata
//! - Boards, installed platforms, and the board registry

pub mod board;
pub mod library;
pub mod properties;

pub use board::{Board, BoardRegistry, FsBoardRegistry, Platform};
pub use library::{normalize_name, Catalog, LibraryRecord};
pub use properties::{format_version, LibraryProperties};
