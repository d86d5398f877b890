//! Command implementations
//!
//! Each command is a module with functions that take parsed CLI args and run
//! the operation against a [`Session`](crate::session::Session).

pub mod assign;
pub mod config;
pub mod emblem;
pub mod tag;
pub mod view;

use crate::EmblemTagsError;
use crate::manager::TagManager;
use crate::store::Tag;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Looks a tag up by id, then by exact name
///
/// # Errors
/// Returns `InvalidInput` if no tag matches.
pub fn resolve_tag(manager: &TagManager, id_or_name: &str) -> Result<Tag> {
    manager
        .find_tag(id_or_name)
        .ok_or_else(|| EmblemTagsError::InvalidInput(format!("Tag '{id_or_name}' not found")))
}

/// Canonical path of a file that must exist
///
/// # Errors
/// Returns `InvalidInput` if the path cannot be accessed.
pub fn existing_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        EmblemTagsError::InvalidInput(format!("Cannot access path '{}': {e}", path.display()))
    })
}

/// Canonical path if the file exists, otherwise the absolute path
///
/// Used where the registry may still mention files that are gone.
///
/// # Errors
/// Returns `IoError` if the current directory cannot be determined.
pub fn lookup_path(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(path) => Ok(path),
        Err(_) => Ok(std::path::absolute(path)?),
    }
}

/// Prompt user for yes/no confirmation
///
/// Quiet mode auto-confirms without prompting.
///
/// # Errors
/// Returns `InvalidInput` if the answer cannot be read.
pub fn confirm(prompt: &str, quiet: bool) -> Result<bool> {
    if quiet {
        return Ok(true);
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| EmblemTagsError::InvalidInput(format!("Failed to read input: {e}")))
}
