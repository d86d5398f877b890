//! Tag store error types
//!
//! Only write-side failures are errors here. A registry that cannot be read or
//! parsed on open is recovered as empty and reported through
//! [`LoadStatus`](super::LoadStatus) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`TagStore`](super::TagStore) mutations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The registry file (or its directory) could not be written
    #[error("Failed to write tag registry {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory document could not be encoded as JSON
    #[error("Error while encoding tag registry: {0}")]
    EncodeError(#[from] serde_json::Error),

    /// A path handed to the store has no UTF-8 representation
    #[error("Path is not valid UTF-8: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.into(),
            source,
        }
    }
}
