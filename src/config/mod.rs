//! Configuration module for emblemtags
//!
//! Stores where the registry, emblems and tag views live, which icon themes
//! receive emblem copies, and how icon caches get rebuilt. The file is TOML
//! in the user's config directory; every key is optional.

use crate::emblem::{CommandRebuilder, ThemeLayout};
use crate::store::REGISTRY_FILE;
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "emblemtags";
const CONFIG_FILE: &str = "config.toml";

const fn default_refresh_delay_ms() -> u64 {
    1000
}

fn default_rebuild_command() -> String {
    crate::emblem::host::DEFAULT_REBUILD_COMMAND.to_string()
}

const fn default_rebuild_timeout_secs() -> u64 {
    5
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EmblemTagsConfig {
    /// Root of `tags.json`, `emblems/` and `views/`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Name of the active icon theme; emblems are also copied into it
    #[serde(default)]
    pub icon_theme: Option<String>,

    /// Directory holding user icon themes
    #[serde(default)]
    pub user_icons_dir: Option<PathBuf>,

    /// Theme root that always receives a scalable copy
    #[serde(default)]
    pub fallback_theme_dir: Option<PathBuf>,

    /// Delay before a coalesced icon-cache refresh runs
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,

    /// Program run as `<command> -f <theme root>` to rebuild an icon cache
    #[serde(default = "default_rebuild_command")]
    pub rebuild_command: String,

    #[serde(default = "default_rebuild_timeout_secs")]
    pub rebuild_timeout_secs: u64,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,
}

impl Default for EmblemTagsConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            icon_theme: None,
            user_icons_dir: None,
            fallback_theme_dir: None,
            refresh_delay_ms: default_refresh_delay_ms(),
            rebuild_command: default_rebuild_command(),
            rebuild_timeout_secs: default_rebuild_timeout_secs(),
            quiet: false,
        }
    }
}

fn missing(what: &str) -> ConfigError {
    ConfigError::Message(format!("Could not determine {what} directory"))
}

impl EmblemTagsConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| missing("config"))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Data directory, defaulting to `<data_local_dir>/emblemtags`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no data directory is configured and the
    /// system one cannot be determined.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_local_dir().ok_or_else(|| missing("data"))?.join(APP_DIR)),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the data directory cannot be determined.
    pub fn registry_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(REGISTRY_FILE))
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the data directory cannot be determined.
    pub fn emblems_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("emblems"))
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the data directory cannot be determined.
    pub fn views_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("views"))
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the user data directory cannot be determined.
    pub fn user_icons_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.user_icons_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir().ok_or_else(|| missing("data"))?.join("icons")),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the home directory cannot be determined.
    pub fn fallback_theme_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.fallback_theme_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::home_dir().ok_or_else(|| missing("home"))?.join(".icons").join("hicolor")),
        }
    }

    /// Resolves the directories emblems are written to
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if one of the default directories cannot be determined.
    pub fn theme_layout(&self) -> Result<ThemeLayout, ConfigError> {
        let theme_root = match &self.icon_theme {
            Some(theme) if !theme.is_empty() => Some(self.user_icons_dir()?.join(theme)),
            _ => None,
        };
        Ok(ThemeLayout::new(self.emblems_dir()?, theme_root, self.fallback_theme_dir()?))
    }

    #[must_use]
    pub const fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    #[must_use]
    pub fn rebuilder(&self) -> CommandRebuilder {
        CommandRebuilder::new(self.rebuild_command.clone(), Duration::from_secs(self.rebuild_timeout_secs))
    }
}
