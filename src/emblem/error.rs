//! Emblem cache error types
//!
//! None of these reach the callers of [`EmblemCache`](super::EmblemCache):
//! a missing badge is cosmetic, so failures are logged and the operation
//! carries on. They exist so the individual steps can use `?` and so
//! toolkit and rebuild hooks have something to report.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmblemError {
    /// Filesystem error while writing, copying or deleting an emblem
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The toolkit refused to register an emblem
    #[error("Failed to register emblem {name}: {reason}")]
    RegistrationError { name: String, reason: String },

    /// The icon cache rebuild exited unsuccessfully
    #[error("Icon cache rebuild for {} failed: {status}", root.display())]
    RebuildFailed { root: PathBuf, status: String },

    /// The icon cache rebuild did not finish in time and was killed
    #[error("Icon cache rebuild for {} timed out after {timeout:?}", root.display())]
    RebuildTimedOut { root: PathBuf, timeout: Duration },

    /// A sweep pattern could not be compiled
    #[error("Invalid emblem pattern: {0}")]
    PatternError(#[from] glob::PatternError),
}
