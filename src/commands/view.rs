//! Tag view command

use super::resolve_tag;
use crate::EmblemTagsError;
use crate::output;
use crate::session::Session;

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Build the link directory of a tag, optionally opening it
///
/// # Errors
/// Returns an error if the tag is unknown, the view cannot be written, or the
/// file manager cannot be launched.
pub fn execute(session: &Session, tag: &str, open: bool, quiet: bool) -> Result<()> {
    let tag = resolve_tag(session.manager(), tag)?;

    let Some(dir) = session.manager().create_tag_view(&tag.id)? else {
        if !quiet {
            println!("No files tagged with {}", output::tag_label(&tag));
        }
        return Ok(());
    };

    if quiet {
        println!("{}", dir.display());
    } else {
        println!("View of {}: {}", output::tag_label(&tag), dir.display());
    }

    if open {
        open::that(&dir)?;
    }
    Ok(())
}
