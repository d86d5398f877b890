//! Emblem cache commands

use super::lookup_path;
use crate::EmblemTagsError;
use crate::emblem::Signature;
use crate::session::Session;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Generate the emblem for `colors` and print its name and file
///
/// # Errors
/// Returns `InvalidInput` if no colors are given.
pub fn colors(session: &Session, colors: &[String], quiet: bool) -> Result<()> {
    let signature = Signature::from_colors(colors)
        .ok_or_else(|| EmblemTagsError::InvalidInput("No colors given".into()))?;

    if let Some(name) = session.cache().create_emblem_icon(colors) {
        print_emblem(session, &name, &signature, quiet);
    }
    Ok(())
}

/// Generate and print the emblem for a file's tags
///
/// # Errors
/// Returns an error if the current directory cannot be determined.
pub fn file(session: &Session, path: &Path, quiet: bool) -> Result<()> {
    let lookup = file_lookup_path(session, path)?;

    match session.emblem_for_file(&lookup) {
        Some(name) => match Signature::from_emblem_name(&name) {
            Some(signature) => print_emblem(session, &name, &signature, quiet),
            None => println!("{name}"),
        },
        None => {
            if !quiet {
                println!("{} has no tags", path.display());
            }
        }
    }
    Ok(())
}

/// Path to look up for `file`
///
/// Entries inside a tag view keep their view path so the view's own color
/// wins; resolving the symlink would land on the real file instead.
fn file_lookup_path(session: &Session, path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    if session.manager().tag_id_from_view_path(&absolute).is_some() {
        return Ok(absolute);
    }
    lookup_path(path)
}

fn print_emblem(session: &Session, name: &str, signature: &Signature, quiet: bool) {
    if quiet {
        println!("{name}");
    } else {
        println!("{name}: {}", session.cache().emblem_path(signature).display());
    }
}

/// Start pregeneration for every tag color combination
///
/// The emblems are written while the caller drives the event loop.
pub fn pregenerate(session: &Session, quiet: bool) {
    let count = session.manager().get_tags().len();
    session.pregenerate(Some(Box::new(move || {
        if !quiet {
            println!("Pregenerated emblems for {count} tag(s)");
        }
    })));
}

/// Delete every emblem using `color`
pub fn purge_color(session: &Session, color: &str, quiet: bool) {
    let deleted = session.cache().delete_emblems_with_color(color);
    if quiet {
        println!("{deleted}");
    } else {
        println!("Deleted {deleted} emblem file(s) with color {color}");
    }
}

/// Schedule an icon cache rebuild and a toolkit rescan
pub fn refresh(session: &Session, quiet: bool) {
    let scheduled = session.cache().schedule_icon_cache_refresh();
    session.cache().refresh_icon_theme();
    if !quiet {
        if scheduled {
            println!("Icon cache refresh scheduled");
        } else {
            println!("Icon cache refresh already pending");
        }
    }
}
