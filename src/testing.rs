//! Testing utilities for emblemtags
//!
//! Provides recording stand-ins for the icon toolkit and the icon-cache
//! rebuild, plus `TestEmblems`, a temporary emblem cache wired to a manually
//! stepped event loop.
//!
//! Only available when compiled with `cfg(test)`.

use crate::dispatch::EventLoop;
use crate::emblem::{CacheRebuilder, EmblemCache, EmblemError, IconHost, ThemeLayout};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Icon host that records registrations and rescans
#[derive(Default)]
pub struct RecordingHost {
    registered: Mutex<Vec<String>>,
    rescans: AtomicUsize,
    reject: bool,
}

impl RecordingHost {
    /// A host whose registrations always fail
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    #[must_use]
    pub fn rescans(&self) -> usize {
        self.rescans.load(Ordering::SeqCst)
    }
}

impl IconHost for RecordingHost {
    fn register_builtin(&self, name: &str, _path: &Path, _size: u32) -> Result<(), EmblemError> {
        if self.reject {
            return Err(EmblemError::RegistrationError {
                name: name.to_string(),
                reason: "rejected by test host".into(),
            });
        }
        self.registered.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn rescan_theme(&self) {
        self.rescans.fetch_add(1, Ordering::SeqCst);
    }
}

/// Rebuilder that records each theme root it is asked to rebuild
#[derive(Default)]
pub struct RecordingRebuilder {
    roots: Mutex<Vec<PathBuf>>,
}

impl RecordingRebuilder {
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots.lock().unwrap().clone()
    }
}

impl CacheRebuilder for RecordingRebuilder {
    fn rebuild(&self, theme_root: &Path) -> Result<(), EmblemError> {
        self.roots.lock().unwrap().push(theme_root.to_path_buf());
        Ok(())
    }
}

/// Temporary emblem cache with recording collaborators
///
/// The layout lives inside a `TempDir` that is removed on drop:
/// `emblems/` (core), `icons/TestTheme` (active theme), `hicolor` (fallback).
pub struct TestEmblems {
    pub dir: TempDir,
    pub event_loop: Arc<EventLoop>,
    pub host: Arc<RecordingHost>,
    pub rebuilder: Arc<RecordingRebuilder>,
    pub cache: EmblemCache,
}

impl TestEmblems {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_host(RecordingHost::default())
    }

    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn with_host(host: RecordingHost) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let event_loop = Arc::new(EventLoop::new());
        let host = Arc::new(host);
        let rebuilder = Arc::new(RecordingRebuilder::default());

        let layout = Self::layout_in(dir.path());
        let cache = EmblemCache::builder(layout.core_dir.clone(), event_loop.clone())
            .layout(layout)
            .host(host.clone())
            .rebuilder(rebuilder.clone())
            .refresh_delay(Duration::from_millis(1000))
            .build();

        Self {
            dir,
            event_loop,
            host,
            rebuilder,
            cache,
        }
    }

    #[must_use]
    pub fn layout_in(root: &Path) -> ThemeLayout {
        ThemeLayout::new(
            root.join("emblems"),
            Some(root.join("icons").join("TestTheme")),
            root.join("hicolor"),
        )
    }

    #[must_use]
    pub fn layout(&self) -> ThemeLayout {
        Self::layout_in(self.dir.path())
    }

    #[must_use]
    pub fn core_dir(&self) -> PathBuf {
        self.layout().core_dir
    }

    /// Runs the event loop until nothing is queued, jumping the clock
    pub fn settle(&self) {
        self.event_loop.run_until_idle(false);
    }

    /// Emblem file names present in `dir`, sorted
    #[must_use]
    pub fn files_in(dir: &Path) -> Vec<String> {
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
}

impl Default for TestEmblems {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a test file with default content
///
/// # Errors
/// Returns an `io::Error` if the file cannot be created or written.
pub fn create_test_file(path: impl AsRef<Path>) -> std::io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"test content")
}

/// Shared counter for callbacks handed to the cache
#[must_use]
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// Completion callback that bumps `count`
#[must_use]
pub fn counting_callback(count: &Arc<AtomicUsize>) -> crate::emblem::Completion {
    let count = Arc::clone(count);
    Box::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}
