//! Persistent tag registry
//!
//! Keeps the ordered tag list and the inverted index (tag id -> paths) in a
//! single JSON document. Every mutation rewrites the whole document before
//! returning; there is no log or incremental append.
//!
//! Mutations are applied to a copy of the document and only become visible
//! in memory once the rewrite succeeded, so a failed write never leaves the
//! in-memory registry ahead of the file on disk.
//!
//! The store assumes a single owning process and does no locking of its own.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub mod ids;
pub mod types;

pub use error::StoreError;
pub use ids::{IdSource, OsRandomIds};
pub use types::{Document, LoadStatus, PathString, Tag};

/// File name of the registry inside the data directory
pub const REGISTRY_FILE: &str = "tags.json";

/// Durable registry of tags and tag assignments
pub struct TagStore {
    path: PathBuf,
    doc: Document,
    ids: Box<dyn IdSource>,
    status: LoadStatus,
}

impl TagStore {
    /// Opens the registry at `path`, creating an empty one if it does not exist
    ///
    /// A registry that exists but cannot be parsed is not an error: the store
    /// starts empty and [`load_status`](Self::load_status) reports
    /// `RecoveredFromCorruption`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a missing registry cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_ids(path, Box::new(OsRandomIds))
    }

    /// Opens the registry using a custom id source
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a missing registry cannot be created.
    pub fn open_with_ids<P: AsRef<Path>>(path: P, ids: Box<dyn IdSource>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let (doc, status) = if path.exists() {
            match read_document(&path) {
                Ok(doc) => (doc, LoadStatus::Loaded),
                Err(reason) => {
                    warn!(
                        "Tag registry {} is unreadable ({reason}); starting with an empty registry",
                        path.display()
                    );
                    (Document::default(), LoadStatus::RecoveredFromCorruption { reason })
                }
            }
        } else {
            let doc = Document::default();
            write_document(&path, &doc)?;
            debug!("Created empty tag registry at {}", path.display());
            (doc, LoadStatus::Created)
        };

        Ok(Self { path, doc, ids, status })
    }

    /// Location of the backing JSON document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How the registry was obtained when this store was opened
    #[must_use]
    pub const fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    /// Creates a tag at the end of the display order and returns its id
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn add_tag(&mut self, name: &str, color: &str) -> Result<String, StoreError> {
        let id = ids::unique_id(self.ids.as_mut(), &self.doc.tags);

        let mut next = self.doc.clone();
        next.tags.push(Tag::new(id.clone(), name, color));
        self.commit(next)?;

        info!("Created tag {id} ({name}, {color})");
        Ok(id)
    }

    /// Snapshot of all tags in display order
    #[must_use]
    pub fn get_tags(&self) -> Vec<Tag> {
        self.doc.tags.clone()
    }

    #[must_use]
    pub fn get_tag_by_id(&self, tag_id: &str) -> Option<Tag> {
        self.doc.tags.iter().find(|tag| tag.id == tag_id).cloned()
    }

    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.doc.tags.len()
    }

    /// Removes a tag together with its index entry
    ///
    /// Returns `false` if no tag had this id. The registry is only rewritten
    /// when something changed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn remove_tag(&mut self, tag_id: &str) -> Result<bool, StoreError> {
        let existed = self.doc.has_id(tag_id);
        if !existed && !self.doc.index.contains_key(tag_id) {
            return Ok(false);
        }

        let mut next = self.doc.clone();
        next.tags.retain(|tag| tag.id != tag_id);
        next.index.remove(tag_id);
        self.commit(next)?;

        if existed {
            info!("Removed tag {tag_id}");
        }
        Ok(existed)
    }

    /// Renames and/or recolors a tag in place
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn update_tag(&mut self, tag_id: &str, name: &str, color: &str) -> Result<bool, StoreError> {
        let Some(pos) = self.doc.position(tag_id) else {
            return Ok(false);
        };

        let mut next = self.doc.clone();
        next.tags[pos].name = name.to_string();
        next.tags[pos].color = color.to_string();
        self.commit(next)?;

        info!("Updated tag {tag_id} ({name}, {color})");
        Ok(true)
    }

    /// Reorders tags to match `tag_ids`
    ///
    /// `tag_ids` must be a permutation of exactly the current ids. Anything
    /// else (missing id, unknown id, repeated id) leaves the order untouched
    /// and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn reorder_tags<S: AsRef<str>>(&mut self, tag_ids: &[S]) -> Result<bool, StoreError> {
        if tag_ids.len() != self.doc.tags.len() {
            return Ok(false);
        }

        let requested: HashSet<&str> = tag_ids.iter().map(|id| id.as_ref()).collect();
        if requested.len() != tag_ids.len() || !self.doc.tags.iter().all(|tag| requested.contains(tag.id.as_str())) {
            return Ok(false);
        }

        let mut next = self.doc.clone();
        next.tags = tag_ids
            .iter()
            .filter_map(|id| self.get_tag_by_id(id.as_ref()))
            .collect();
        self.commit(next)?;

        debug!("Reordered {} tags", tag_ids.len());
        Ok(true)
    }

    /// Records that `path` carries `tag_id`; does nothing if it already does
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn assign_tag(&mut self, tag_id: &str, path: &str) -> Result<(), StoreError> {
        if self.is_tagged(tag_id, path) {
            return Ok(());
        }

        let mut next = self.doc.clone();
        next.index.entry(tag_id.to_string()).or_default().push(path.to_string());
        self.commit(next)?;

        debug!("Assigned tag {tag_id} to {path}");
        Ok(())
    }

    /// Removes `path` from the tag's entry; does nothing if it is not there
    ///
    /// An entry left without paths is dropped from the index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn unassign_tag(&mut self, tag_id: &str, path: &str) -> Result<(), StoreError> {
        if !self.is_tagged(tag_id, path) {
            return Ok(());
        }

        let mut next = self.doc.clone();
        if let Some(files) = next.index.get_mut(tag_id) {
            files.retain(|f| f != path);
            if files.is_empty() {
                next.index.remove(tag_id);
            }
        }
        self.commit(next)?;

        debug!("Unassigned tag {tag_id} from {path}");
        Ok(())
    }

    /// Paths carrying `tag_id`, in assignment order
    #[must_use]
    pub fn files_by_tag(&self, tag_id: &str) -> Vec<String> {
        self.doc.index.get(tag_id).cloned().unwrap_or_default()
    }

    /// Tags assigned to `path`, in display order
    #[must_use]
    pub fn tags_for_file(&self, path: &str) -> Vec<Tag> {
        self.doc
            .tags
            .iter()
            .filter(|tag| self.is_tagged(&tag.id, path))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_tagged(&self, tag_id: &str, path: &str) -> bool {
        self.doc
            .index
            .get(tag_id)
            .is_some_and(|files| files.iter().any(|f| f == path))
    }

    /// Rewrites the registry with the current in-memory state
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn flush(&self) -> Result<(), StoreError> {
        write_document(&self.path, &self.doc)
    }

    fn commit(&mut self, next: Document) -> Result<(), StoreError> {
        write_document(&self.path, &next)?;
        self.doc = next;
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Document, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// Writes the document to a sibling temp file and renames it over `path`
fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::write(parent, e))?;
    }

    let json = serde_json::to_string_pretty(doc)?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, json).map_err(|e| StoreError::write(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::write(path, e))?;
    Ok(())
}
