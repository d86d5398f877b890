//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for emblemtags using the
//! `clap` crate.
//!
//! # Commands
//!
//! - **tag**: Create, list, edit, reorder and delete tags
//! - **assign** / **unassign**: Attach tags to files or detach them
//! - **files** / **tags-for**: Query the registry in either direction
//! - **view**: Build a directory of links to every file carrying a tag
//! - **emblem**, **pregenerate**, **purge-color**, **refresh**: Emblem cache
//! - **config**: Read and change settings
//! - **completions**: Print a shell completion script
//!
//! Tags are addressed by id or by exact name. Colors are `#RRGGBB`.
//!
//! # Examples
//!
//! ```
//! use emblemtags::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["emblemtags", "assign", "work", "notes.txt"]);
//! assert!(matches!(cli.command, Commands::Assign { .. }));
//! ```

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static COLOR_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new("^#[0-9A-Fa-f]{6}$"));

/// Validates a `#RRGGBB` color argument
///
/// # Errors
///
/// Returns a message for clap if `value` is not a six-digit hex color.
pub fn parse_color(value: &str) -> Result<String, String> {
    let pattern = COLOR_PATTERN.as_ref().map_err(ToString::to_string)?;
    if pattern.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(format!("'{value}' is not a color, expected #RRGGBB"))
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., `icon_theme=Papirus`)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., quiet)
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the config file location
    Path,
}

/// Tag management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TagCommands {
    /// Create a tag, optionally applying it to files
    #[command(visible_alias = "new")]
    Create {
        name: String,

        #[arg(value_parser = parse_color)]
        color: String,

        /// Files to tag straight away
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
    },

    /// List all tags in display order
    #[command(visible_alias = "ls")]
    List,

    /// Show a tag and its files
    Show {
        /// Tag id or name
        tag: String,
    },

    /// Replace a tag's name and color
    Update {
        /// Tag id or name
        tag: String,

        name: String,

        #[arg(value_parser = parse_color)]
        color: String,
    },

    /// Rename a tag
    #[command(visible_alias = "mv")]
    Rename {
        /// Tag id or name
        tag: String,

        name: String,
    },

    /// Change a tag's color and rebuild its emblems
    Recolor {
        /// Tag id or name
        tag: String,

        #[arg(value_parser = parse_color)]
        color: String,
    },

    /// Delete a tag and the emblems that use its color
    #[command(visible_alias = "rm")]
    Delete {
        /// Tag id or name
        tag: String,

        /// Skip the confirmation prompt
        #[arg(short = 'f', long = "force")]
        force: bool,
    },

    /// Set the display order; must name every tag exactly once
    Reorder {
        /// Tag ids or names in their new order
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

/// Emblem subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum EmblemCommands {
    /// Emblem for a file's current tags
    File {
        path: PathBuf,
    },
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "emblemtags")]
#[command(about = "Color tags for files, shown as file-manager emblems", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage tags
    #[command(visible_alias = "t")]
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Apply a tag to files
    #[command(visible_alias = "a")]
    Assign {
        /// Tag id or name
        tag: String,

        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove a tag from files
    #[command(visible_alias = "u")]
    Unassign {
        /// Tag id or name
        tag: String,

        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// List the files carrying a tag
    Files {
        /// Tag id or name
        tag: String,
    },

    /// List the tags on a file
    #[command(name = "tags-for")]
    TagsFor {
        file: PathBuf,
    },

    /// Build the link directory of a tag
    View {
        /// Tag id or name
        tag: String,

        /// Open the view in the default file manager
        #[arg(short = 'o', long = "open")]
        open: bool,
    },

    /// Generate the emblem for a list of colors
    #[command(args_conflicts_with_subcommands = true)]
    Emblem {
        #[command(subcommand)]
        command: Option<EmblemCommands>,

        /// Colors in display order; only the last three are drawn
        #[arg(value_name = "COLORS", value_parser = parse_color)]
        colors: Vec<String>,
    },

    /// Generate emblems for every combination of tag colors
    Pregenerate,

    /// Delete every emblem that uses a color
    #[command(name = "purge-color")]
    PurgeColor {
        #[arg(value_parser = parse_color)]
        color: String,
    },

    /// Rebuild icon-theme caches
    Refresh,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

impl Cli {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
