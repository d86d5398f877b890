//! Config command - read and change settings

use crate::EmblemTagsError;
use crate::cli::ConfigCommands;
use crate::config::EmblemTagsConfig;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Keys accepted by `config set` and `config get`
pub const CONFIG_KEYS: [&str; 8] = [
    "data_dir",
    "icon_theme",
    "user_icons_dir",
    "fallback_theme_dir",
    "refresh_delay_ms",
    "rebuild_command",
    "rebuild_timeout_secs",
    "quiet",
];

fn unknown_key(key: &str) -> EmblemTagsError {
    EmblemTagsError::InvalidInput(format!(
        "Unknown configuration key: '{key}'. Available keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

fn invalid_value(key: &str, value: &str, expected: &str) -> EmblemTagsError {
    EmblemTagsError::InvalidInput(format!("Invalid value for {key}: '{value}'. Use {expected}"))
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn show_path(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

/// Applies `key=value` to `config`
///
/// An empty value resets an optional key to its default.
///
/// # Errors
/// Returns `InvalidInput` for unknown keys or unparsable values.
pub fn set_value(config: &mut EmblemTagsConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => config.data_dir = optional_path(value),
        "icon_theme" => config.icon_theme = (!value.is_empty()).then(|| value.to_string()),
        "user_icons_dir" => config.user_icons_dir = optional_path(value),
        "fallback_theme_dir" => config.fallback_theme_dir = optional_path(value),
        "refresh_delay_ms" => {
            config.refresh_delay_ms = value
                .parse()
                .map_err(|_| invalid_value(key, value, "a number of milliseconds"))?;
        }
        "rebuild_command" => {
            if value.is_empty() {
                return Err(invalid_value(key, value, "a program name"));
            }
            config.rebuild_command = value.to_string();
        }
        "rebuild_timeout_secs" => {
            config.rebuild_timeout_secs = value
                .parse()
                .map_err(|_| invalid_value(key, value, "a number of seconds"))?;
        }
        "quiet" => {
            config.quiet = value.parse().map_err(|_| invalid_value(key, value, "'true' or 'false'"))?;
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

/// Reads `key` from `config` as display text
///
/// # Errors
/// Returns `InvalidInput` for unknown keys.
pub fn get_value(config: &EmblemTagsConfig, key: &str) -> Result<String> {
    let value = match key {
        "data_dir" => show_path(config.data_dir.as_ref()),
        "icon_theme" => config.icon_theme.clone().unwrap_or_default(),
        "user_icons_dir" => show_path(config.user_icons_dir.as_ref()),
        "fallback_theme_dir" => show_path(config.fallback_theme_dir.as_ref()),
        "refresh_delay_ms" => config.refresh_delay_ms.to_string(),
        "rebuild_command" => config.rebuild_command.clone(),
        "rebuild_timeout_secs" => config.rebuild_timeout_secs.to_string(),
        "quiet" => config.quiet.to_string(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

/// Execute a config subcommand against the file at `path`
///
/// # Errors
/// Returns `EmblemTagsError` if the key is invalid, value parsing fails,
/// or configuration save fails.
pub fn execute(mut config: EmblemTagsConfig, path: &Path, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let Some((key, value)) = setting.split_once('=') else {
                return Err(EmblemTagsError::InvalidInput(
                    "Invalid format. Use: emblemtags config set key=value".into(),
                ));
            };
            let (key, value) = (key.trim(), value.trim());

            set_value(&mut config, key, value)?;
            config.save_to(path)?;
            if !quiet {
                println!("Set {key} = {value}");
            }
        }
        ConfigCommands::Get { key } => {
            println!("{}", get_value(&config, key)?);
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
