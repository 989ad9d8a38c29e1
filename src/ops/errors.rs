//! Library load error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A failure that aborts a whole library load.
///
/// Only the index can fail a load; problems with individual installed
/// libraries degrade those entries instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch library index into {}", path.display())]
    Fetch {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read library index {}", path.display())]
    ReadIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse library index {}", path.display())]
    ParseIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// The index path involved.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Fetch { path, .. }
            | LoadError::ReadIndex { path, .. }
            | LoadError::ParseIndex { path, .. } => path,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_location(self.path().clone());

        match self {
            LoadError::Fetch { source, .. } => {
                let chain = error_chain(source.as_ref());
                let mut diag = diag.with_context(chain.clone());
                if chain.contains("offline") {
                    diag = diag.with_suggestion(suggestions::OFFLINE);
                }
                diag.with_suggestion(suggestions::FETCH_FAILED)
            }
            LoadError::ReadIndex { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::REFRESH_INDEX),
            LoadError::ParseIndex { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::REFRESH_INDEX),
        }
    }
}

/// Join an error and its sources into one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        parts.push(cause.to_string());
        current = cause.source();
    }
    parts.join(": ")
}
