//! Registry value types
//!
//! - **`Tag`**: a named, colored label in display order
//! - **`Document`**: the whole persisted registry (tags plus assignment index)
//! - **`LoadStatus`**: how the registry came into memory when the store opened
//! - **`PathString`**: a path that is known to be valid UTF-8

use super::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A named, colored tag
///
/// `color` is kept exactly as given (normally `#RRGGBB`); the store never
/// validates or normalizes it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The persisted registry: `{"tags": [...], "index": {tag_id: [path, ...]}}`
///
/// Tag order is display order. Each index entry keeps paths in insertion
/// order without duplicates.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub index: BTreeMap<String, Vec<String>>,
}

impl Document {
    pub(crate) fn position(&self, tag_id: &str) -> Option<usize> {
        self.tags.iter().position(|tag| tag.id == tag_id)
    }

    pub(crate) fn has_id(&self, tag_id: &str) -> bool {
        self.position(tag_id).is_some()
    }
}

/// Outcome of reading the registry when a store is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No registry existed; an empty one was written
    Created,
    /// The registry was read and parsed
    Loaded,
    /// The registry existed but could not be read or parsed. The store
    /// started empty and the next mutation will overwrite the old file.
    RecoveredFromCorruption { reason: String },
}

impl LoadStatus {
    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::RecoveredFromCorruption { .. })
    }

    /// Why the previous registry was discarded, if it was
    #[must_use]
    pub fn recovery_reason(&self) -> Option<&str> {
        match self {
            Self::RecoveredFromCorruption { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Wrapper for a path that guarantees valid UTF-8 string representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathString(String);

impl PathString {
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the path contains invalid UTF-8.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        path.as_ref()
            .to_str()
            .map(|s| Self(s.to_string()))
            .ok_or_else(|| StoreError::InvalidPath(path.as_ref().display().to_string()))
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PathString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for PathString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
