//! Integration tests for emblemtags
//!
//! These tests drive the public API end to end: a registry in a temporary
//! directory, an emblem cache on a manually stepped event loop, and the
//! session workflows that tie them together.

use emblemtags::emblem::{CacheRebuilder, EmblemCache, EmblemError, IconHost, ThemeLayout};
use emblemtags::{EventLoop, LoadStatus, Session, TagManager, TagStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct CountingHost {
    registered: AtomicUsize,
    rescans: AtomicUsize,
}

impl IconHost for CountingHost {
    fn register_builtin(&self, _name: &str, _path: &Path, _size: u32) -> Result<(), EmblemError> {
        self.registered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rescan_theme(&self) {
        self.rescans.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct LoggingRebuilder {
    roots: Mutex<Vec<PathBuf>>,
}

impl CacheRebuilder for LoggingRebuilder {
    fn rebuild(&self, theme_root: &Path) -> Result<(), EmblemError> {
        self.roots.lock().unwrap().push(theme_root.to_path_buf());
        Ok(())
    }
}

struct Harness {
    dir: TempDir,
    event_loop: Arc<EventLoop>,
    host: Arc<CountingHost>,
    rebuilder: Arc<LoggingRebuilder>,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            event_loop: Arc::new(EventLoop::new()),
            host: Arc::new(CountingHost::default()),
            rebuilder: Arc::new(LoggingRebuilder::default()),
        }
    }

    fn layout(&self) -> ThemeLayout {
        let root = self.dir.path();
        ThemeLayout::new(root.join("emblems"), Some(root.join("icons/Test")), root.join("hicolor"))
    }

    fn session(&self) -> Session {
        let root = self.dir.path();
        let manager = TagManager::open(root.join("tags.json"), root.join("views")).unwrap();
        let cache = EmblemCache::builder(root.join("emblems"), self.event_loop.clone())
            .layout(self.layout())
            .host(self.host.clone())
            .rebuilder(self.rebuilder.clone())
            .refresh_delay(Duration::from_millis(1000))
            .build();
        Session::new(manager, cache)
    }

    fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("files").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "content").unwrap();
        path
    }

    fn emblems_in(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn settle(&self) {
        self.event_loop.run_until_idle(false);
    }
}

#[test]
fn test_registry_survives_restart() {
    let h = Harness::new();
    let file = h.file("report.pdf");

    let (work, urgent) = {
        let mut session = h.session();
        let work = session.create_tag("work", "#3498db", &[&file]).unwrap();
        let urgent = session.create_tag("urgent", "#e74c3c", &[&file]).unwrap();
        session.reorder_tags(&[&urgent, &work]).unwrap();
        (work, urgent)
    };

    let session = h.session();
    let manager = session.manager();
    assert_eq!(manager.load_status(), &LoadStatus::Loaded);
    let ids: Vec<_> = manager.get_tags_for_file(&file).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![urgent, work.clone()]);
    assert_eq!(manager.get_files_by_tag(&work), vec![file]);
}

#[test]
fn test_registry_file_is_plain_json() {
    let h = Harness::new();
    let file = h.file("a.txt");
    let mut session = h.session();
    let id = session.create_tag("work", "#3498db", &[&file]).unwrap();

    let raw = fs::read_to_string(h.dir.path().join("tags.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["tags"][0]["id"], id.as_str());
    assert_eq!(value["tags"][0]["color"], "#3498db");
    assert_eq!(value["index"][&id][0], file.to_str().unwrap());
}

#[test]
fn test_corrupt_registry_is_reported_then_replaced() {
    let h = Harness::new();
    let registry = h.dir.path().join("tags.json");
    fs::write(&registry, "{ not json").unwrap();

    let mut store = TagStore::open(&registry).unwrap();
    assert!(store.load_status().is_recovered());
    assert_eq!(store.tag_count(), 0);

    store.add_tag("fresh", "#000000").unwrap();
    let reopened = TagStore::open(&registry).unwrap();
    assert_eq!(reopened.load_status(), &LoadStatus::Loaded);
    assert_eq!(reopened.tag_count(), 1);
}

#[test]
fn test_file_emblem_tracks_tag_changes() {
    let h = Harness::new();
    let file = h.file("a.txt");
    let mut session = h.session();

    let red = session.create_tag("red", "#FF0000", &[&file]).unwrap();
    assert_eq!(session.emblem_for_file(&file).as_deref(), Some("tag-emblem-ff0000"));

    session.create_tag("green", "#00FF00", &[&file]).unwrap();
    assert_eq!(session.emblem_for_file(&file).as_deref(), Some("tag-emblem-ff0000-00ff00"));

    session.remove_tag_from_files(&red, &[&file]).unwrap();
    assert_eq!(session.emblem_for_file(&file).as_deref(), Some("tag-emblem-00ff00"));
}

#[test]
fn test_emblems_installed_and_refreshed_once() {
    let h = Harness::new();
    let layout = h.layout();
    for root in layout.theme_roots() {
        fs::create_dir_all(root).unwrap();
    }
    let file = h.file("a.txt");
    let mut session = h.session();

    session.create_tag("a", "#111111", &[&file]).unwrap();
    session.create_tag("b", "#222222", &[&file]).unwrap();
    h.settle();

    let expected = vec![
        "tag-emblem-111111-222222.svg".to_string(),
        "tag-emblem-111111.svg".to_string(),
        "tag-emblem-222222.svg".to_string(),
    ];
    for dir in layout.sweep_dirs() {
        assert_eq!(h.emblems_in(&dir), expected, "{}", dir.display());
    }
    assert_eq!(h.host.registered.load(Ordering::SeqCst), 3);
    assert_eq!(h.host.rescans.load(Ordering::SeqCst), 1);
    assert_eq!(*h.rebuilder.roots.lock().unwrap(), layout.theme_roots());
}

#[test]
fn test_deleting_a_tag_removes_its_emblems_everywhere() {
    let h = Harness::new();
    let layout = h.layout();
    let file = h.file("a.txt");
    let mut session = h.session();

    let red = session.create_tag("red", "#ff0000", &[&file]).unwrap();
    session.create_tag("blue", "#0000ff", &[&file]).unwrap();
    h.settle();

    session.delete_tag(&red).unwrap();
    h.settle();

    for dir in layout.sweep_dirs() {
        assert_eq!(h.emblems_in(&dir), vec!["tag-emblem-0000ff.svg"], "{}", dir.display());
    }
    assert_eq!(session.emblem_for_file(&file).as_deref(), Some("tag-emblem-0000ff"));
}

#[test]
fn test_recolor_regenerates_for_tagged_files() {
    let h = Harness::new();
    let tagged = h.file("a.txt");
    let mut session = h.session();
    let tag = session.create_tag("t", "#aa0000", &[&tagged]).unwrap();
    h.settle();

    session.recolor_tag(&tag, "#00aa00").unwrap();

    let core = h.dir.path().join("emblems");
    assert!(core.join("tag-emblem-00aa00.svg").exists());
    assert!(!core.join("tag-emblem-aa0000.svg").exists());
    assert_eq!(session.emblem_for_file(&tagged).as_deref(), Some("tag-emblem-00aa00"));
}

#[cfg(unix)]
#[test]
fn test_tag_view_overrides_file_emblem() {
    let h = Harness::new();
    let file = h.file("a.txt");
    let mut session = h.session();
    let red = session.create_tag("red", "#ff0000", &[&file]).unwrap();
    session.create_tag("blue", "#0000ff", &[&file]).unwrap();

    let view = session.manager().create_tag_view(&red).unwrap().unwrap();
    let link = view.join("a.txt");

    assert!(link.symlink_metadata().is_ok());
    assert_eq!(session.emblem_for_file(&link).as_deref(), Some("tag-emblem-ff0000"));
    assert_eq!(session.emblem_for_file(&file).as_deref(), Some("tag-emblem-ff0000-0000ff"));
}

#[test]
fn test_pregeneration_callback_runs_once() {
    let h = Harness::new();
    let mut session = h.session();
    for (name, color) in [("a", "#111111"), ("b", "#222222"), ("c", "#333333"), ("d", "#444444")] {
        session.manager_mut().create_tag(name, color).unwrap();
    }
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);

    session.pregenerate(Some(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })));
    h.settle();

    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(h.emblems_in(&h.dir.path().join("emblems")).len(), 14);
}
