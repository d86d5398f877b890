//! Emblemtags - color tags for files, shown as file-manager emblems
//!
//! This library keeps a durable registry of colored tags and which files
//! carry them, and renders the tags of a file as a small SVG emblem that is
//! cached and installed into the user's icon themes.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod completions;
pub mod config;
pub mod dispatch;
pub mod emblem;
pub mod manager;
pub mod output;
pub mod session;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use dispatch::{Dispatcher, EventLoop, Step};
pub use emblem::{EmblemCache, EmblemError, Signature};
pub use manager::TagManager;
pub use session::Session;
pub use store::{LoadStatus, StoreError, Tag, TagStore};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum EmblemTagsError {
    /// Tag registry error
    #[error("Registry error: {0}")]
    StoreError(#[from] StoreError),
    /// Emblem generation error
    #[error("Emblem error: {0}")]
    EmblemError(#[from] EmblemError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
