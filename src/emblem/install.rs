//! Emblem install locations
//!
//! An emblem is written once into the core emblem directory and then copied
//! into every icon-theme directory the host scans:
//!
//! - `<theme_root>/16/emblems`, `<theme_root>/22/emblems`,
//!   `<theme_root>/scalable/emblems` for the active theme (if one is known)
//! - `<fallback_root>/scalable/emblems`
//!
//! The set of locations is plain data resolved per operation, never read from
//! global toolkit state.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Emblem subdirectories of the active theme
pub const THEME_EMBLEM_SUBDIRS: [&str; 3] = ["16/emblems", "22/emblems", "scalable/emblems"];

/// Emblem subdirectory of the fallback theme
pub const FALLBACK_EMBLEM_SUBDIR: &str = "scalable/emblems";

/// Where emblems are generated and installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeLayout {
    /// Directory holding the generated emblems
    pub core_dir: PathBuf,
    /// Root of the user's active icon theme, if known
    pub theme_root: Option<PathBuf>,
    /// Root of the fallback theme
    pub fallback_root: PathBuf,
}

impl ThemeLayout {
    #[must_use]
    pub fn new(core_dir: impl Into<PathBuf>, theme_root: Option<PathBuf>, fallback_root: impl Into<PathBuf>) -> Self {
        Self {
            core_dir: core_dir.into(),
            theme_root,
            fallback_root: fallback_root.into(),
        }
    }

    /// Directories that receive a copy of each emblem
    #[must_use]
    pub fn install_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .theme_root
            .iter()
            .flat_map(|root| THEME_EMBLEM_SUBDIRS.iter().map(move |sub| root.join(sub)))
            .collect();
        dirs.push(self.fallback_root.join(FALLBACK_EMBLEM_SUBDIR));
        dirs
    }

    /// Theme roots whose icon caches need rebuilding after changes
    #[must_use]
    pub fn theme_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.theme_root.iter().cloned().collect();
        if !roots.contains(&self.fallback_root) {
            roots.push(self.fallback_root.clone());
        }
        roots
    }

    /// Every directory that may contain emblem files
    #[must_use]
    pub fn sweep_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.install_dirs();
        dirs.push(self.core_dir.clone());
        dirs
    }
}

/// Copies `source` as `file_name` into each directory, best effort
///
/// Returns how many copies landed. A failing directory is logged and skipped.
pub fn install_copies(source: &Path, file_name: &str, dirs: &[PathBuf]) -> usize {
    let mut installed = 0;
    for dir in dirs {
        let target = dir.join(file_name);
        let result = fs::create_dir_all(dir).and_then(|()| fs::copy(source, &target));
        match result {
            Ok(_) => {
                installed += 1;
                debug!("Installed emblem {}", target.display());
            }
            Err(e) => warn!("Could not install emblem into {}: {e}", dir.display()),
        }
    }
    installed
}
