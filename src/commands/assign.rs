//! Assign, unassign and lookup commands

use super::{existing_path, lookup_path, resolve_tag};
use crate::EmblemTagsError;
use crate::output;
use crate::session::Session;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Apply a tag to files
///
/// # Errors
/// Returns an error if the tag is unknown, a file cannot be accessed, or the
/// registry cannot be written.
pub fn assign(session: &mut Session, tag: &str, files: &[PathBuf], quiet: bool) -> Result<()> {
    let tag = resolve_tag(session.manager(), tag)?;
    let files = files.iter().map(|f| existing_path(f)).collect::<Result<Vec<_>>>()?;

    session.apply_tag(&tag.id, &files)?;

    if !quiet {
        println!("Tagged {} file(s) with {}", files.len(), output::tag_label(&tag));
    }
    Ok(())
}

/// Remove a tag from files
///
/// Files that no longer exist can still be unassigned.
///
/// # Errors
/// Returns an error if the tag is unknown or the registry cannot be written.
pub fn unassign(session: &mut Session, tag: &str, files: &[PathBuf], quiet: bool) -> Result<()> {
    let tag = resolve_tag(session.manager(), tag)?;
    let files = files.iter().map(|f| lookup_path(f)).collect::<Result<Vec<_>>>()?;

    session.remove_tag_from_files(&tag.id, &files)?;

    if !quiet {
        println!("Removed {} from {} file(s)", output::tag_label(&tag), files.len());
    }
    Ok(())
}

/// List the files carrying a tag
///
/// # Errors
/// Returns an error if the tag is unknown.
pub fn files(session: &Session, tag: &str, quiet: bool) -> Result<()> {
    let manager = session.manager();
    let tag = resolve_tag(manager, tag)?;
    let files = manager.get_files_by_tag(&tag.id);

    if files.is_empty() {
        if !quiet {
            println!("No files tagged with {}", output::tag_label(&tag));
        }
        return Ok(());
    }

    if !quiet {
        println!("Files tagged with {}:", output::tag_label(&tag));
    }
    for file in &files {
        println!("{}", output::file_line(file, quiet));
    }
    Ok(())
}

/// List the tags on a file, in display order
///
/// # Errors
/// Returns an error if the current directory cannot be determined.
pub fn tags_for(session: &Session, file: &Path, quiet: bool) -> Result<()> {
    let path = lookup_path(file)?;
    let tags = session.manager().get_tags_for_file(&path);

    if tags.is_empty() {
        if !quiet {
            println!("{} has no tags", file.display());
        }
        return Ok(());
    }

    for tag in &tags {
        if quiet {
            println!("{}", tag.id);
        } else {
            println!("  {} ({})", output::tag_label(tag), tag.id);
        }
    }
    Ok(())
}
