//! Tag directory facade
//!
//! `TagManager` is the surface the file-manager integration calls. It passes
//! registry operations through to [`TagStore`], converting `Path`s to the
//! string keys the registry uses, and adds one convenience of its own: tag
//! views, directories of symlinks to every file carrying a tag.
//!
//! Views live at `<views_dir>/tag-<id>/`.

use crate::store::{LoadStatus, PathString, StoreError, Tag, TagStore};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory name prefix of a tag view
pub const VIEW_PREFIX: &str = "tag-";

pub struct TagManager {
    store: TagStore,
    views_dir: PathBuf,
}

impl TagManager {
    /// Opens the registry at `registry` and keeps views under `views_dir`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a missing registry cannot be created.
    pub fn open(registry: impl AsRef<Path>, views_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::with_store(TagStore::open(registry)?, views_dir))
    }

    #[must_use]
    pub fn with_store(store: TagStore, views_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            views_dir: views_dir.into(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &TagStore {
        &self.store
    }

    #[must_use]
    pub fn views_dir(&self) -> &Path {
        &self.views_dir
    }

    #[must_use]
    pub const fn load_status(&self) -> &LoadStatus {
        self.store.load_status()
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn create_tag(&mut self, name: &str, color: &str) -> Result<String, StoreError> {
        self.store.add_tag(name, color)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn delete_tag(&mut self, tag_id: &str) -> Result<bool, StoreError> {
        self.store.remove_tag(tag_id)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn update_tag(&mut self, tag_id: &str, name: &str, color: &str) -> Result<bool, StoreError> {
        self.store.update_tag(tag_id, name, color)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn reorder_tags<S: AsRef<str>>(&mut self, tag_ids: &[S]) -> Result<bool, StoreError> {
        self.store.reorder_tags(tag_ids)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the path is not valid UTF-8 or the registry
    /// cannot be written.
    pub fn assign_tag_to_file<P: AsRef<Path>>(&mut self, tag_id: &str, file: P) -> Result<(), StoreError> {
        let path = PathString::new(file)?;
        self.store.assign_tag(tag_id, &path)
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the path is not valid UTF-8 or the registry
    /// cannot be written.
    pub fn unassign_tag_from_file<P: AsRef<Path>>(&mut self, tag_id: &str, file: P) -> Result<(), StoreError> {
        let path = PathString::new(file)?;
        self.store.unassign_tag(tag_id, &path)
    }

    #[must_use]
    pub fn get_tags(&self) -> Vec<Tag> {
        self.store.get_tags()
    }

    #[must_use]
    pub fn get_tag_by_id(&self, tag_id: &str) -> Option<Tag> {
        self.store.get_tag_by_id(tag_id)
    }

    /// Looks a tag up by id, falling back to an exact name match
    #[must_use]
    pub fn find_tag(&self, id_or_name: &str) -> Option<Tag> {
        self.store
            .get_tag_by_id(id_or_name)
            .or_else(|| self.store.get_tags().into_iter().find(|tag| tag.name == id_or_name))
    }

    #[must_use]
    pub fn get_files_by_tag(&self, tag_id: &str) -> Vec<PathBuf> {
        self.store.files_by_tag(tag_id).into_iter().map(PathBuf::from).collect()
    }

    /// Tags of `file` in display order; empty for non-UTF-8 paths
    #[must_use]
    pub fn get_tags_for_file<P: AsRef<Path>>(&self, file: P) -> Vec<Tag> {
        file.as_ref()
            .to_str()
            .map(|path| self.store.tags_for_file(path))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_file_tagged<P: AsRef<Path>>(&self, tag_id: &str, file: P) -> bool {
        file.as_ref()
            .to_str()
            .is_some_and(|path| self.store.is_tagged(tag_id, path))
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the registry cannot be written.
    pub fn flush_db(&self) -> Result<(), StoreError> {
        self.store.flush()
    }

    /// Directory a tag's view is materialized in
    #[must_use]
    pub fn view_dir(&self, tag_id: &str) -> PathBuf {
        self.views_dir.join(format!("{VIEW_PREFIX}{tag_id}"))
    }

    /// Rebuilds the view directory of a tag
    ///
    /// Any previous view is removed first. Files that no longer exist are
    /// skipped; clashing file names get `_1`, `_2`, ... before the extension.
    /// Returns `None` when the tag has no files.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the view directory cannot be replaced. Failing
    /// to create an individual link is logged and skipped.
    pub fn create_tag_view(&self, tag_id: &str) -> io::Result<Option<PathBuf>> {
        let files = self.get_files_by_tag(tag_id);
        if files.is_empty() {
            return Ok(None);
        }

        let view_dir = self.view_dir(tag_id);
        if view_dir.exists() {
            fs::remove_dir_all(&view_dir)?;
        }
        fs::create_dir_all(&view_dir)?;

        for file in files.iter().filter(|file| file.exists()) {
            let Some(link) = free_link_path(&view_dir, file) else {
                continue;
            };
            match symlink(file, &link) {
                Ok(()) => debug!("Linked {} -> {}", link.display(), file.display()),
                Err(e) => warn!("Could not link {} into tag view: {e}", file.display()),
            }
        }

        Ok(Some(view_dir))
    }

    /// The tag whose view contains `path`, if any
    #[must_use]
    pub fn tag_id_from_view_path<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let relative = path.as_ref().strip_prefix(&self.views_dir).ok()?;
        match relative.components().next()? {
            Component::Normal(first) => first
                .to_str()?
                .strip_prefix(VIEW_PREFIX)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }
}

/// First unused link name for `file` inside `dir`
fn free_link_path(dir: &Path, file: &Path) -> Option<PathBuf> {
    let name = file.file_name()?;
    let mut link = dir.join(name);

    let stem = file.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = file.extension().map(|e| e.to_string_lossy().to_string());

    let mut counter = 1;
    while link.symlink_metadata().is_ok() {
        let candidate = match &ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        link = dir.join(candidate);
        counter += 1;
    }
    Some(link)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_file;
    use tempfile::TempDir;

    fn manager() -> (TempDir, TagManager) {
        let dir = TempDir::new().unwrap();
        let manager = TagManager::open(dir.path().join("tags.json"), dir.path().join("views")).unwrap();
        (dir, manager)
    }

    #[test]
    fn test_pass_through_operations() {
        let (dir, mut manager) = manager();
        let file = dir.path().join("notes.md");

        let id = manager.create_tag("work", "#3498db").unwrap();
        manager.assign_tag_to_file(&id, &file).unwrap();

        assert!(manager.is_file_tagged(&id, &file));
        assert_eq!(manager.get_files_by_tag(&id), vec![file.clone()]);
        assert_eq!(manager.get_tags_for_file(&file)[0].name, "work");

        manager.unassign_tag_from_file(&id, &file).unwrap();
        assert!(!manager.is_file_tagged(&id, &file));

        assert!(manager.update_tag(&id, "job", "#000000").unwrap());
        assert_eq!(manager.get_tag_by_id(&id).unwrap().name, "job");
        assert!(manager.delete_tag(&id).unwrap());
        assert!(manager.get_tags().is_empty());
    }

    #[test]
    fn test_find_tag_by_id_or_name() {
        let (_dir, mut manager) = manager();
        let id = manager.create_tag("urgent", "#ff0000").unwrap();

        assert_eq!(manager.find_tag(&id).unwrap().name, "urgent");
        assert_eq!(manager.find_tag("urgent").unwrap().id, id);
        assert!(manager.find_tag("missing").is_none());
    }

    #[test]
    fn test_create_tag_view_links_existing_files() {
        let (dir, mut manager) = manager();
        let present = dir.path().join("a").join("report.pdf");
        let missing = dir.path().join("gone.txt");
        create_test_file(&present).unwrap();

        let id = manager.create_tag("docs", "#00ff00").unwrap();
        manager.assign_tag_to_file(&id, &present).unwrap();
        manager.assign_tag_to_file(&id, &missing).unwrap();

        let view = manager.create_tag_view(&id).unwrap().unwrap();

        assert_eq!(view, dir.path().join("views").join(format!("tag-{id}")));
        let link = view.join("report.pdf");
        assert_eq!(fs::read_link(&link).unwrap(), present);
        assert!(!view.join("gone.txt").exists());
    }

    #[test]
    fn test_create_tag_view_renames_clashes() {
        let (dir, mut manager) = manager();
        let first = dir.path().join("one").join("todo.txt");
        let second = dir.path().join("two").join("todo.txt");
        let third = dir.path().join("three").join("todo.txt");
        for file in [&first, &second, &third] {
            create_test_file(file).unwrap();
        }

        let id = manager.create_tag("todo", "#ffff00").unwrap();
        for file in [&first, &second, &third] {
            manager.assign_tag_to_file(&id, file).unwrap();
        }

        let view = manager.create_tag_view(&id).unwrap().unwrap();

        assert_eq!(fs::read_link(view.join("todo.txt")).unwrap(), first);
        assert_eq!(fs::read_link(view.join("todo_1.txt")).unwrap(), second);
        assert_eq!(fs::read_link(view.join("todo_2.txt")).unwrap(), third);
    }

    #[test]
    fn test_create_tag_view_replaces_previous_view() {
        let (dir, mut manager) = manager();
        let keep = dir.path().join("keep.txt");
        let dropped = dir.path().join("drop.txt");
        create_test_file(&keep).unwrap();
        create_test_file(&dropped).unwrap();

        let id = manager.create_tag("t", "#123456").unwrap();
        manager.assign_tag_to_file(&id, &keep).unwrap();
        manager.assign_tag_to_file(&id, &dropped).unwrap();
        manager.create_tag_view(&id).unwrap();

        manager.unassign_tag_from_file(&id, &dropped).unwrap();
        let view = manager.create_tag_view(&id).unwrap().unwrap();

        assert!(view.join("keep.txt").symlink_metadata().is_ok());
        assert!(view.join("drop.txt").symlink_metadata().is_err());
    }

    #[test]
    fn test_create_tag_view_without_files() {
        let (_dir, mut manager) = manager();
        let id = manager.create_tag("empty", "#000000").unwrap();

        assert_eq!(manager.create_tag_view(&id).unwrap(), None);
        assert!(!manager.view_dir(&id).exists());
    }

    #[test]
    fn test_tag_id_from_view_path() {
        let (dir, manager) = manager();
        let views = dir.path().join("views");

        assert_eq!(
            manager.tag_id_from_view_path(views.join("tag-0a1b2c3d").join("file.txt")),
            Some("0a1b2c3d".to_string())
        );
        assert_eq!(manager.tag_id_from_view_path(views.join("tag-0a1b2c3d")), Some("0a1b2c3d".to_string()));
        assert_eq!(manager.tag_id_from_view_path(views.join("other").join("file.txt")), None);
        assert_eq!(manager.tag_id_from_view_path(views.join("tag-")), None);
        assert_eq!(manager.tag_id_from_view_path(dir.path().join("file.txt")), None);
        assert_eq!(manager.tag_id_from_view_path(&views), None);
    }
}
