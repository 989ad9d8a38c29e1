//! High-level operations.
//!
//! This module contains the library load pipeline and the state that
//! publishes its results.

pub mod errors;
pub mod load;
pub mod manager;
pub mod tag;

pub use errors::LoadError;
pub use load::{load_libraries, LibrarySettings};
pub use manager::LibraryManager;
pub use tag::{is_supported, tag_supported};
