//! Seams to the icon toolkit and the external icon-cache rebuild
//!
//! Both are injected into [`EmblemCache`](super::EmblemCache) so the cache can
//! run headless (CLI, tests) or inside a GUI host.

use super::error::EmblemError;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Icon toolkit operations used by the emblem cache
///
/// Implementations are only ever called from the dispatcher's loop thread.
pub trait IconHost: Send + Sync {
    /// Registers an in-memory icon so it is displayable without a theme rescan
    ///
    /// # Errors
    ///
    /// Returns `EmblemError::RegistrationError` if the toolkit rejects the image.
    fn register_builtin(&self, name: &str, path: &Path, size: u32) -> Result<(), EmblemError>;

    /// Asks the toolkit to pick up on-disk theme changes
    fn rescan_theme(&self);
}

/// Host without a toolkit; registration and rescans do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl IconHost for NullHost {
    fn register_builtin(&self, name: &str, _path: &Path, _size: u32) -> Result<(), EmblemError> {
        debug!("No icon toolkit, skipping registration of {name}");
        Ok(())
    }

    fn rescan_theme(&self) {}
}

/// Rebuilds the on-disk icon cache of one theme root
pub trait CacheRebuilder: Send + Sync {
    /// # Errors
    ///
    /// Returns `EmblemError` if the rebuild fails or times out.
    fn rebuild(&self, theme_root: &Path) -> Result<(), EmblemError>;
}

/// Runs `<program> -f <theme_root>`, killing it after a timeout
#[derive(Debug, Clone)]
pub struct CommandRebuilder {
    program: String,
    timeout: Duration,
}

/// Default external rebuild program
pub const DEFAULT_REBUILD_COMMAND: &str = "gtk-update-icon-cache";

/// Default bound on one rebuild run
pub const DEFAULT_REBUILD_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

impl CommandRebuilder {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for CommandRebuilder {
    fn default() -> Self {
        Self::new(DEFAULT_REBUILD_COMMAND, DEFAULT_REBUILD_TIMEOUT)
    }
}

impl CacheRebuilder for CommandRebuilder {
    fn rebuild(&self, theme_root: &Path) -> Result<(), EmblemError> {
        let mut child = Command::new(&self.program)
            .arg("-f")
            .arg(theme_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                if status.success() {
                    debug!("Rebuilt icon cache for {}", theme_root.display());
                    return Ok(());
                }
                return Err(EmblemError::RebuildFailed {
                    root: theme_root.to_path_buf(),
                    status: status.to_string(),
                });
            }

            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EmblemError::RebuildTimedOut {
                    root: theme_root.to_path_buf(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Rebuilder that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRebuilder;

impl CacheRebuilder for NoopRebuilder {
    fn rebuild(&self, _theme_root: &Path) -> Result<(), EmblemError> {
        Ok(())
    }
}

/// Resolved list of rebuild targets, for logging
pub(crate) fn describe_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_rebuilder_success() {
        let dir = TempDir::new().unwrap();
        let rebuilder = CommandRebuilder::new("true", Duration::from_secs(5));
        assert!(rebuilder.rebuild(dir.path()).is_ok());
    }

    #[test]
    fn test_command_rebuilder_failure_status() {
        let dir = TempDir::new().unwrap();
        let rebuilder = CommandRebuilder::new("false", Duration::from_secs(5));
        assert!(matches!(
            rebuilder.rebuild(dir.path()),
            Err(EmblemError::RebuildFailed { .. })
        ));
    }

    #[test]
    fn test_command_rebuilder_missing_program() {
        let dir = TempDir::new().unwrap();
        let rebuilder = CommandRebuilder::new("definitely-not-an-icon-cache-tool", Duration::from_secs(1));
        assert!(matches!(rebuilder.rebuild(dir.path()), Err(EmblemError::IoError(_))));
    }

    #[test]
    fn test_describe_roots() {
        let roots = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        assert_eq!(describe_roots(&roots), "/a, /b");
    }
}
