//! Output formatting for CLI display
//!
//! Tags are printed with a swatch in their own color; paths are green when
//! the file exists and red when it is gone.

use crate::store::Tag;
use colored::Colorize;
use std::path::Path;

const SWATCH: &str = "●";

/// Splits `#RRGGBB` into its channels
#[must_use]
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// A dot painted in `color`, or a plain dot if the color does not parse
#[must_use]
pub fn swatch(color: &str) -> String {
    match hex_to_rgb(color) {
        Some((r, g, b)) => SWATCH.truecolor(r, g, b).to_string(),
        None => SWATCH.to_string(),
    }
}

/// Format a tag for listing
///
/// Quiet output is just the id, for piping into other commands.
#[must_use]
pub fn tag_line(tag: &Tag, count: usize, quiet: bool) -> String {
    if quiet {
        tag.id.clone()
    } else {
        format!(
            "  {} {} {} {} ({count} file(s))",
            swatch(&tag.color),
            tag.name.bold(),
            tag.color.dimmed(),
            tag.id.dimmed()
        )
    }
}

/// Format a tag name with its swatch
#[must_use]
pub fn tag_label(tag: &Tag) -> String {
    format!("{} {}", swatch(&tag.color), tag.name)
}

/// Color a path based on file existence (green if exists, red if missing)
#[must_use]
pub fn colorize_path(path: &Path) -> String {
    let formatted = path.display().to_string();
    if path.exists() {
        formatted.green().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Format a file path for listing
#[must_use]
pub fn file_line(path: &Path, quiet: bool) -> String {
    if quiet {
        path.display().to_string()
    } else {
        format!("  {}", colorize_path(path))
    }
}
