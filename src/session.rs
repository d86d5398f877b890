//! Tag lifecycle workflows
//!
//! The registry and the emblem cache are independent: a tag changing color
//! does not by itself touch any badge on disk. `Session` holds both and runs
//! the follow-up emblem work that each registry change needs, the way the
//! file-manager integration drives them. Emblem work is best effort; only
//! registry failures are returned.

use crate::EmblemTagsError;
use crate::emblem::{Completion, EmblemCache};
use crate::manager::TagManager;
use crate::store::Tag;
use log::debug;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Pixel size requested for the icon shown next to a tag in menus
pub const TAG_ICON_SIZE: u32 = 16;

pub struct Session {
    manager: TagManager,
    cache: EmblemCache,
}

impl Session {
    #[must_use]
    pub const fn new(manager: TagManager, cache: EmblemCache) -> Self {
        Self { manager, cache }
    }

    #[must_use]
    pub const fn manager(&self) -> &TagManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut TagManager {
        &mut self.manager
    }

    #[must_use]
    pub const fn cache(&self) -> &EmblemCache {
        &self.cache
    }

    /// Colors of the tags on `file`, in display order
    #[must_use]
    pub fn colors_for_file<P: AsRef<Path>>(&self, file: P) -> Vec<String> {
        self.manager
            .get_tags_for_file(file)
            .into_iter()
            .map(|tag| tag.color)
            .collect()
    }

    /// Emblem to overlay on `file`
    ///
    /// Inside a tag view a file shows only that view's tag. Elsewhere it shows
    /// all of its tags. Returns `None` for untagged files.
    pub fn emblem_for_file<P: AsRef<Path>>(&self, file: P) -> Option<String> {
        if let Some(tag_id) = self.manager.tag_id_from_view_path(&file) {
            let tag = self.manager.get_tag_by_id(&tag_id)?;
            return self.cache.create_emblem_icon(&[tag.color]);
        }

        self.refresh_file_emblem(file)
    }

    fn refresh_file_emblem<P: AsRef<Path>>(&self, file: P) -> Option<String> {
        let colors = self.colors_for_file(file);
        self.cache.create_emblem_icon(&colors)
    }

    /// Pregenerates emblems for the current tag set
    pub fn pregenerate(&self, on_done: Option<Completion>) {
        self.cache.pregenerate_all_combinations(&self.manager.get_tags(), on_done);
    }

    /// Creates a tag and applies it to `files`
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn create_tag<P: AsRef<Path>>(&mut self, name: &str, color: &str, files: &[P]) -> Result<String> {
        let tag_id = self.manager.create_tag(name, color)?;

        self.cache.create_tag_icon(color, TAG_ICON_SIZE);
        self.pregenerate(None);

        self.apply_tag(&tag_id, files)?;
        Ok(tag_id)
    }

    /// Assigns a tag to each file and rebuilds the file's emblem
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn apply_tag<P: AsRef<Path>>(&mut self, tag_id: &str, files: &[P]) -> Result<()> {
        for file in files {
            self.manager.assign_tag_to_file(tag_id, file)?;
            self.refresh_file_emblem(file);
        }
        Ok(())
    }

    /// Removes a tag from each file, rebuilds their emblems and pregenerates
    /// for the remaining tag set
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn remove_tag_from_files<P: AsRef<Path>>(&mut self, tag_id: &str, files: &[P]) -> Result<()> {
        for file in files {
            self.manager.unassign_tag_from_file(tag_id, file)?;
            self.refresh_file_emblem(file);
        }
        self.pregenerate(None);
        Ok(())
    }

    /// Renames a tag, keeping its color
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn rename_tag(&mut self, tag_id: &str, name: &str) -> Result<bool> {
        let Some(tag) = self.manager.get_tag_by_id(tag_id) else {
            return Ok(false);
        };
        Ok(self.manager.update_tag(tag_id, name, &tag.color)?)
    }

    /// Changes a tag's color and rebuilds the emblems of its files
    ///
    /// Badges that used the old color are swept and the known signatures are
    /// forgotten. The files that carried the tag get fresh emblems straight
    /// away; other files regenerate lazily.
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn recolor_tag(&mut self, tag_id: &str, color: &str) -> Result<bool> {
        let Some(tag) = self.manager.get_tag_by_id(tag_id) else {
            return Ok(false);
        };
        if tag.color == color {
            return Ok(true);
        }

        let files = self.manager.get_files_by_tag(tag_id);
        self.manager.update_tag(tag_id, &tag.name, color)?;

        self.cache.delete_emblems_with_color(&tag.color);
        self.cache.clear_known();
        self.cache.create_tag_icon(color, TAG_ICON_SIZE);
        self.refresh_existing(&files);
        Ok(true)
    }

    /// Deletes a tag, sweeps its emblems and rebuilds the emblems of the files
    /// that carried it
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn delete_tag(&mut self, tag_id: &str) -> Result<Option<Tag>> {
        let Some(tag) = self.manager.get_tag_by_id(tag_id) else {
            return Ok(None);
        };

        let files = self.manager.get_files_by_tag(tag_id);
        self.manager.delete_tag(tag_id)?;

        self.cache.delete_emblems_with_color(&tag.color);
        self.refresh_existing(&files);
        Ok(Some(tag))
    }

    /// Reorders tags; emblems follow the new order on their next request
    ///
    /// # Errors
    ///
    /// Returns `EmblemTagsError` if the registry cannot be written.
    pub fn reorder_tags<S: AsRef<str>>(&mut self, tag_ids: &[S]) -> Result<bool> {
        Ok(self.manager.reorder_tags(tag_ids)?)
    }

    fn refresh_existing(&self, files: &[PathBuf]) {
        for file in files.iter().filter(|file| file.exists()) {
            if self.refresh_file_emblem(file).is_none() {
                debug!("{} has no tags left", file.display());
            }
        }
    }
}
