//! Tag management commands

use super::{confirm, existing_path, resolve_tag};
use crate::EmblemTagsError;
use crate::cli::TagCommands;
use crate::output;
use crate::session::Session;
use std::path::PathBuf;

type Result<T> = std::result::Result<T, EmblemTagsError>;

/// Execute a tag subcommand
///
/// # Errors
/// Returns an error if a tag cannot be resolved, input is invalid, or the
/// registry cannot be written.
pub fn execute(session: &mut Session, command: &TagCommands, quiet: bool) -> Result<()> {
    match command {
        TagCommands::Create { name, color, files } => create(session, name, color, files, quiet),
        TagCommands::List => list(session, quiet),
        TagCommands::Show { tag } => show(session, tag, quiet),
        TagCommands::Update { tag, name, color } => update(session, tag, Some(name), Some(color), quiet),
        TagCommands::Rename { tag, name } => update(session, tag, Some(name), None, quiet),
        TagCommands::Recolor { tag, color } => update(session, tag, None, Some(color), quiet),
        TagCommands::Delete { tag, force } => delete(session, tag, *force || quiet),
        TagCommands::Reorder { tags } => reorder(session, tags, quiet),
    }
}

fn create(session: &mut Session, name: &str, color: &str, files: &[PathBuf], quiet: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EmblemTagsError::InvalidInput("Tag name cannot be empty".into()));
    }
    if session.manager().get_tags().iter().any(|tag| tag.name == name) {
        return Err(EmblemTagsError::InvalidInput(format!("Tag '{name}' already exists")));
    }

    let files = files.iter().map(|f| existing_path(f)).collect::<Result<Vec<_>>>()?;
    let id = session.create_tag(name, color, &files)?;

    if quiet {
        println!("{id}");
    } else {
        let tag = resolve_tag(session.manager(), &id)?;
        println!("Created tag {} ({id})", output::tag_label(&tag));
        if !files.is_empty() {
            println!("Tagged {} file(s)", files.len());
        }
    }
    Ok(())
}

fn list(session: &Session, quiet: bool) -> Result<()> {
    let manager = session.manager();
    let tags = manager.get_tags();

    if tags.is_empty() {
        if !quiet {
            println!("No tags found.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags:");
    }
    for tag in &tags {
        let count = manager.get_files_by_tag(&tag.id).len();
        println!("{}", output::tag_line(tag, count, quiet));
    }
    Ok(())
}

fn show(session: &Session, id_or_name: &str, quiet: bool) -> Result<()> {
    let manager = session.manager();
    let tag = resolve_tag(manager, id_or_name)?;
    let files = manager.get_files_by_tag(&tag.id);

    if !quiet {
        println!("{}", output::tag_label(&tag));
        println!("  id:    {}", tag.id);
        println!("  color: {}", tag.color);
        println!("  files: {}", files.len());
    }
    for file in &files {
        println!("{}", output::file_line(file, quiet));
    }
    Ok(())
}

fn update(
    session: &mut Session,
    id_or_name: &str,
    name: Option<&String>,
    color: Option<&String>,
    quiet: bool,
) -> Result<()> {
    let tag = resolve_tag(session.manager(), id_or_name)?;

    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(EmblemTagsError::InvalidInput("Tag name cannot be empty".into()));
        }
        session.rename_tag(&tag.id, name)?;
    }
    if let Some(color) = color {
        session.recolor_tag(&tag.id, color)?;
    }

    if !quiet {
        let updated = resolve_tag(session.manager(), &tag.id)?;
        println!("Updated {} -> {}", output::tag_label(&tag), output::tag_label(&updated));
    }
    Ok(())
}

fn delete(session: &mut Session, id_or_name: &str, skip_prompt: bool) -> Result<()> {
    let tag = resolve_tag(session.manager(), id_or_name)?;
    let count = session.manager().get_files_by_tag(&tag.id).len();

    if !skip_prompt {
        println!("Tag {} is used by {count} file(s).", output::tag_label(&tag));
    }
    if !confirm("Delete this tag?", skip_prompt)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.delete_tag(&tag.id)?;
    if !skip_prompt {
        println!("Deleted tag '{}'", tag.name);
    }
    Ok(())
}

fn reorder(session: &mut Session, order: &[String], quiet: bool) -> Result<()> {
    let ids = order
        .iter()
        .map(|t| resolve_tag(session.manager(), t).map(|tag| tag.id))
        .collect::<Result<Vec<_>>>()?;

    if !session.reorder_tags(&ids)? {
        return Err(EmblemTagsError::InvalidInput(format!(
            "Reorder must list each of the {} tags exactly once",
            session.manager().get_tags().len()
        )));
    }

    if !quiet {
        println!("Reordered {} tag(s)", ids.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TagManager;
    use crate::testing::{TestEmblems, create_test_file};

    fn session(env: &TestEmblems) -> Session {
        let root = env.dir.path();
        let manager = TagManager::open(root.join("tags.json"), root.join("views")).unwrap();
        Session::new(manager, env.cache.clone())
    }

    fn run(session: &mut Session, command: TagCommands) -> Result<()> {
        execute(session, &command, true)
    }

    #[test]
    fn test_create_with_files() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        let file = env.dir.path().join("a.txt");
        create_test_file(&file).unwrap();

        run(
            &mut session,
            TagCommands::Create {
                name: "work".into(),
                color: "#3498db".into(),
                files: vec![file.clone()],
            },
        )
        .unwrap();

        let tag = session.manager().find_tag("work").unwrap();
        assert!(session.manager().is_file_tagged(&tag.id, file.canonicalize().unwrap()));
    }

    #[test]
    fn test_create_rejects_duplicates_and_missing_files() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        let create = |name: &str, files: Vec<PathBuf>| TagCommands::Create {
            name: name.into(),
            color: "#3498db".into(),
            files,
        };

        run(&mut session, create("work", vec![])).unwrap();

        assert!(run(&mut session, create("work", vec![])).is_err());
        assert!(run(&mut session, create("  ", vec![])).is_err());
        assert!(run(&mut session, create("play", vec![env.dir.path().join("missing")])).is_err());
        assert_eq!(session.manager().get_tags().len(), 1);
    }

    #[test]
    fn test_update_by_name() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        session.create_tag("work", "#3498db", &[] as &[PathBuf]).unwrap();

        run(
            &mut session,
            TagCommands::Update {
                tag: "work".into(),
                name: "job".into(),
                color: "#e74c3c".into(),
            },
        )
        .unwrap();

        let tag = session.manager().find_tag("job").unwrap();
        assert_eq!(tag.color, "#e74c3c");
    }

    #[test]
    fn test_delete_quiet_skips_prompt() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        session.create_tag("work", "#3498db", &[] as &[PathBuf]).unwrap();

        run(
            &mut session,
            TagCommands::Delete {
                tag: "work".into(),
                force: false,
            },
        )
        .unwrap();

        assert!(session.manager().get_tags().is_empty());
    }

    #[test]
    fn test_reorder_by_name() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        let a = session.create_tag("a", "#111111", &[] as &[PathBuf]).unwrap();
        let b = session.create_tag("b", "#222222", &[] as &[PathBuf]).unwrap();

        run(&mut session, TagCommands::Reorder { tags: vec!["b".into(), "a".into()] }).unwrap();

        let ids: Vec<_> = session.manager().get_tags().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_partial_reorder_is_rejected() {
        let env = TestEmblems::new();
        let mut session = session(&env);
        session.create_tag("a", "#111111", &[] as &[PathBuf]).unwrap();
        session.create_tag("b", "#222222", &[] as &[PathBuf]).unwrap();

        let result = run(&mut session, TagCommands::Reorder { tags: vec!["b".into()] });

        assert!(matches!(result, Err(EmblemTagsError::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_tag() {
        let env = TestEmblems::new();
        let mut session = session(&env);

        assert!(run(&mut session, TagCommands::Show { tag: "nope".into() }).is_err());
    }
}
