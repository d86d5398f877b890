//! Emblem artifact cache
//!
//! Turns an ordered list of tag colors into a small SVG badge that a file
//! manager overlays on file icons. For each signature the cache:
//!
//! 1. writes the image into the core emblem directory,
//! 2. registers it with the icon toolkit (on the dispatcher's loop),
//! 3. copies it into every icon-theme emblem directory,
//! 4. schedules one coalesced icon-cache refresh.
//!
//! # Shared state
//!
//! The set of signatures generated in this process and the pending-refresh
//! flag sit behind one mutex, held only for the check or update itself.
//! Generation runs outside the lock, so two callers racing on the same new
//! signature may both write it; each write is a complete rewrite of a small
//! file, so the last writer wins and the file stays well-formed.
//!
//! The known set is not persisted. After a restart every emblem is generated
//! again on first use, even if its file is still on disk.
//!
//! # Pregeneration
//!
//! [`EmblemCache::pregenerate_all_combinations`] walks every color
//! combination in idle steps of [`PREGEN_BATCH`] emblems. Starting a new walk
//! supersedes one still in flight: the old walk stops at its next step,
//! invokes its own completion callback and skips the refresh, which is left
//! to the newest walk.

use crate::dispatch::{Dispatcher, Step};
use crate::store::Tag;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

pub mod combos;
pub mod error;
pub mod host;
pub mod install;
pub mod signature;
pub mod svg;

pub use error::EmblemError;
pub use host::{CacheRebuilder, CommandRebuilder, IconHost, NoopRebuilder, NullHost};
pub use install::ThemeLayout;
pub use signature::{EMBLEM_EXTENSION, EMBLEM_PREFIX, MAX_EMBLEM_COLORS, Signature};

/// Emblems generated per pregeneration step
pub const PREGEN_BATCH: usize = 5;

/// Delay before a scheduled icon-cache refresh runs
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1000);

/// Pixel size used for builtin toolkit registration
pub const BUILTIN_ICON_SIZE: u32 = 16;

/// Callback run on the loop thread when a pregeneration walk ends
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Whether generating an emblem should schedule a refresh of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    Schedule,
    /// Used by bulk generation, which schedules one refresh at the end
    Skip,
}

type LayoutResolver = Box<dyn Fn() -> ThemeLayout + Send + Sync>;

#[derive(Default)]
struct CacheState {
    known: HashSet<String>,
    refresh_pending: bool,
    pregen_generation: u64,
}

struct Inner {
    state: Mutex<CacheState>,
    layout: LayoutResolver,
    host: Arc<dyn IconHost>,
    rebuilder: Arc<dyn CacheRebuilder>,
    dispatcher: Arc<dyn Dispatcher>,
    refresh_delay: Duration,
}

/// Shared handle to the emblem cache
///
/// Cloning is cheap; every clone sees the same known set and refresh flag.
#[derive(Clone)]
pub struct EmblemCache {
    inner: Arc<Inner>,
}

/// Builder for [`EmblemCache`]
pub struct EmblemCacheBuilder {
    layout: LayoutResolver,
    host: Arc<dyn IconHost>,
    rebuilder: Arc<dyn CacheRebuilder>,
    dispatcher: Arc<dyn Dispatcher>,
    refresh_delay: Duration,
}

impl EmblemCacheBuilder {
    /// Uses a fixed set of install locations
    #[must_use]
    pub fn layout(self, layout: ThemeLayout) -> Self {
        self.layout_resolver(move || layout.clone())
    }

    /// Resolves install locations anew for every operation
    #[must_use]
    pub fn layout_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> ThemeLayout + Send + Sync + 'static,
    {
        self.layout = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn host(mut self, host: Arc<dyn IconHost>) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn rebuilder(mut self, rebuilder: Arc<dyn CacheRebuilder>) -> Self {
        self.rebuilder = rebuilder;
        self
    }

    #[must_use]
    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    #[must_use]
    pub fn build(self) -> EmblemCache {
        EmblemCache {
            inner: Arc::new(Inner {
                state: Mutex::new(CacheState::default()),
                layout: self.layout,
                host: self.host,
                rebuilder: self.rebuilder,
                dispatcher: self.dispatcher,
                refresh_delay: self.refresh_delay,
            }),
        }
    }
}

impl EmblemCache {
    /// Starts a builder with the given core directory and dispatcher
    ///
    /// Defaults: no active theme, fallback root `<core_dir>/hicolor`,
    /// [`NullHost`], [`NoopRebuilder`], [`DEFAULT_REFRESH_DELAY`].
    pub fn builder(core_dir: impl Into<PathBuf>, dispatcher: Arc<dyn Dispatcher>) -> EmblemCacheBuilder {
        let core_dir = core_dir.into();
        let fallback = core_dir.join("hicolor");
        let layout = ThemeLayout::new(core_dir, None, fallback);

        EmblemCacheBuilder {
            layout: Box::new(move || layout.clone()),
            host: Arc::new(NullHost),
            rebuilder: Arc::new(NoopRebuilder),
            dispatcher,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Install locations as resolved right now
    #[must_use]
    pub fn layout(&self) -> ThemeLayout {
        (self.inner.layout)()
    }

    /// Path of a generated emblem in the core directory
    #[must_use]
    pub fn emblem_path(&self, signature: &Signature) -> PathBuf {
        self.layout().core_dir.join(signature.file_name())
    }

    /// Whether `signature` was generated during this process
    #[must_use]
    pub fn is_known(&self, signature: &Signature) -> bool {
        self.state().known.contains(signature.as_str())
    }

    #[must_use]
    pub fn known_count(&self) -> usize {
        self.state().known.len()
    }

    /// Forgets every generated signature so the next request regenerates
    pub fn clear_known(&self) {
        self.state().known.clear();
    }

    /// Whether a coalesced refresh is waiting to run
    #[must_use]
    pub fn refresh_pending(&self) -> bool {
        self.state().refresh_pending
    }

    /// Returns the emblem for a single color and its core SVG path
    ///
    /// `size` is advisory: the image is vector and the toolkit scales it.
    pub fn create_tag_icon(&self, color: &str, size: u32) -> PathBuf {
        let signature = Signature::single(color);
        debug!("Tag icon for {color} requested at {size}px");
        self.create_emblem_icon(&[color]);
        self.emblem_path(&signature)
    }

    /// Returns the emblem name for `colors`, generating it on first use
    ///
    /// Only the last [`MAX_EMBLEM_COLORS`] colors are drawn. Returns `None`
    /// for an empty list.
    pub fn create_emblem_icon<S: AsRef<str>>(&self, colors: &[S]) -> Option<String> {
        self.create_emblem_icon_with(colors, RefreshPolicy::Schedule)
    }

    /// Like [`create_emblem_icon`](Self::create_emblem_icon) with control over
    /// refresh scheduling
    pub fn create_emblem_icon_with<S: AsRef<str>>(&self, colors: &[S], refresh: RefreshPolicy) -> Option<String> {
        let signature = Signature::from_colors(colors)?;
        let name = signature.emblem_name();

        if self.is_known(&signature) {
            debug!("Emblem {name} already generated");
            return Some(name);
        }

        let drawn = signature::truncate_colors(colors);
        let layout = self.layout();
        let path = match write_emblem(&layout.core_dir, &signature, drawn) {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not write emblem {name}: {e}");
                return Some(name);
            }
        };

        self.register_builtin(&name, &path);

        let copies = install::install_copies(&path, &signature.file_name(), &layout.install_dirs());
        debug!("Generated emblem {name} ({} colors, {copies} copies)", drawn.len());

        if refresh == RefreshPolicy::Schedule {
            self.schedule_icon_cache_refresh();
        }

        self.state().known.insert(signature.as_str().to_string());
        Some(name)
    }

    fn register_builtin(&self, name: &str, path: &Path) {
        let host = Arc::clone(&self.inner.host);
        let name = name.to_string();
        let path = path.to_path_buf();
        self.inner.dispatcher.idle_once(Box::new(move || {
            if let Err(e) = host.register_builtin(&name, &path, BUILTIN_ICON_SIZE) {
                warn!("{e}");
            }
        }));
    }

    /// Schedules one icon-cache refresh after the configured delay
    ///
    /// Returns `false` if a refresh is already pending, in which case nothing
    /// new is scheduled. The refresh runs on the dispatcher's loop: it rebuilds
    /// the cache of every existing theme root, asks the toolkit to rescan and
    /// then clears the pending flag.
    pub fn schedule_icon_cache_refresh(&self) -> bool {
        {
            let mut state = self.state();
            if state.refresh_pending {
                return false;
            }
            state.refresh_pending = true;
        }

        debug!("Icon cache refresh scheduled in {:?}", self.inner.refresh_delay);
        let weak = self.downgrade();
        self.inner.dispatcher.timeout(
            self.inner.refresh_delay,
            Box::new(move || {
                if let Some(cache) = Self::upgrade(&weak) {
                    cache.run_refresh();
                }
            }),
        );
        true
    }

    fn run_refresh(&self) {
        let _pending = PendingRefresh(self);
        let roots: Vec<PathBuf> = self.layout().theme_roots().into_iter().filter(|root| root.exists()).collect();
        debug!("Refreshing icon caches: {}", host::describe_roots(&roots));

        for root in &roots {
            if let Err(e) = self.inner.rebuilder.rebuild(root) {
                warn!("{e}");
            }
        }
        self.inner.host.rescan_theme();
    }

    /// Asks the toolkit to rescan its theme on the loop thread
    pub fn refresh_icon_theme(&self) {
        let host = Arc::clone(&self.inner.host);
        self.inner.dispatcher.idle_once(Box::new(move || host.rescan_theme()));
    }

    /// Generates emblems for every combination of the tags' colors
    ///
    /// Combinations of 1 up to [`MAX_EMBLEM_COLORS`] distinct colors are
    /// produced in idle steps of [`PREGEN_BATCH`]. When the walk finishes, one
    /// refresh is scheduled and `on_done` runs. With no colors, `on_done` is
    /// dispatched straight away and no refresh is scheduled.
    pub fn pregenerate_all_combinations(&self, tags: &[Tag], on_done: Option<Completion>) {
        let generation = {
            let mut state = self.state();
            state.pregen_generation += 1;
            state.pregen_generation
        };

        let colors = combos::distinct_colors(tags);
        let combos = combos::combinations(&colors, MAX_EMBLEM_COLORS);

        if combos.is_empty() {
            if let Some(done) = on_done {
                self.inner.dispatcher.idle_once(done);
            }
            return;
        }

        info!("Pregenerating emblems for {} colors ({} combinations)", colors.len(), combos.len());

        let weak = self.downgrade();
        let mut pending = combos.into_iter();
        let mut on_done = on_done;

        self.inner.dispatcher.idle(Box::new(move || {
            let Some(cache) = Self::upgrade(&weak) else {
                return Step::Done;
            };

            if cache.state().pregen_generation != generation {
                debug!("Pregeneration run {generation} superseded");
                if let Some(done) = on_done.take() {
                    done();
                }
                return Step::Done;
            }

            for _ in 0..PREGEN_BATCH {
                let Some(colors) = pending.next() else {
                    info!("Pregeneration complete");
                    cache.schedule_icon_cache_refresh();
                    if let Some(done) = on_done.take() {
                        done();
                    }
                    return Step::Done;
                };
                cache.create_emblem_icon_with(&colors, RefreshPolicy::Skip);
            }
            Step::Continue
        }));
    }

    /// Deletes every emblem whose signature contains `color`
    ///
    /// Sweeps the core directory and all install directories, forgets the
    /// matching signatures and schedules one refresh if any file was removed.
    /// Returns the number of files deleted.
    pub fn delete_emblems_with_color(&self, color: &str) -> usize {
        let component = signature::color_component(color);
        if component.is_empty() {
            return 0;
        }

        let mut deleted = 0;
        for dir in self.layout().sweep_dirs() {
            if !dir.is_dir() {
                continue;
            }
            match sweep_dir(&dir, &component) {
                Ok(count) => deleted += count,
                Err(e) => warn!("Could not scan {} for emblems: {e}", dir.display()),
            }
        }

        self.state().known.retain(|sig| !sig.contains(&component));

        if deleted > 0 {
            info!("Deleted {deleted} emblem file(s) with color {color}");
            self.schedule_icon_cache_refresh();
        }
        deleted
    }
}

fn write_emblem<S: AsRef<str>>(core_dir: &Path, signature: &Signature, colors: &[S]) -> Result<PathBuf, EmblemError> {
    fs::create_dir_all(core_dir)?;
    let path = core_dir.join(signature.file_name());
    fs::write(&path, svg::render(colors))?;
    Ok(path)
}

fn sweep_dir(dir: &Path, component: &str) -> Result<usize, EmblemError> {
    let pattern = format!(
        "{}/{EMBLEM_PREFIX}-*{}*.{EMBLEM_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(component)
    );
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };

    let mut deleted = 0;
    for entry in glob::glob_with(&pattern, options)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not read emblem entry: {e}");
                continue;
            }
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                deleted += 1;
                debug!("Deleted emblem {}", path.display());
            }
            Err(e) => warn!("Could not delete emblem {}: {e}", path.display()),
        }
    }
    Ok(deleted)
}

/// Clears the pending refresh flag when a refresh run ends, even by unwinding
struct PendingRefresh<'a>(&'a EmblemCache);

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        self.0.state().refresh_pending = false;
    }
}
