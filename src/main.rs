//! Emblemtags CLI application entry point
//!
//! Manages color tags on files and the emblem icons a file manager shows for
//! them.
//!
//! # Usage
//!
//! ```bash
//! # Create a tag and apply it
//! emblemtags tag create work '#3498db' report.pdf
//! emblemtags assign work notes.txt
//!
//! # Query
//! emblemtags files work
//! emblemtags tags-for notes.txt
//!
//! # Emblems
//! emblemtags emblem file notes.txt
//! emblemtags pregenerate
//!
//! # Quiet mode (only output results)
//! emblemtags -q tag list
//! ```
//!
//! # Configuration
//!
//! Settings live in the user's config directory
//! (`~/.config/emblemtags/config.toml` on Linux) and are created with
//! defaults on first run.

use clap::CommandFactory;
use emblemtags::cli::{Cli, Commands, EmblemCommands};
use emblemtags::config::EmblemTagsConfig;
use emblemtags::emblem::{EmblemCache, NullHost};
use emblemtags::{EmblemTagsError, EventLoop, Session, TagManager, commands, completions};
use log::LevelFilter;
use std::io;
use std::sync::Arc;

type Result<T> = std::result::Result<T, EmblemTagsError>;

fn init_logging(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Opens the registry and emblem cache described by `config`
///
/// # Errors
///
/// Returns `EmblemTagsError` if a directory cannot be determined or the
/// registry cannot be created.
fn open_session(config: &EmblemTagsConfig, event_loop: &Arc<EventLoop>) -> Result<Session> {
    let manager = TagManager::open(config.registry_path()?, config.views_dir()?)?;
    if let Some(reason) = manager.load_status().recovery_reason() {
        eprintln!("Warning: tag registry was unreadable ({reason}); it will be overwritten on the next change");
    }

    let resolver_config = config.clone();
    let fallback = config.theme_layout()?;
    let cache = EmblemCache::builder(config.emblems_dir()?, event_loop.clone())
        .layout_resolver(move || resolver_config.theme_layout().unwrap_or_else(|_| fallback.clone()))
        .host(Arc::new(NullHost))
        .rebuilder(Arc::new(config.rebuilder()))
        .refresh_delay(config.refresh_delay())
        .build();

    Ok(Session::new(manager, cache))
}

/// Main entry point for the emblemtags application
///
/// Parses arguments, loads configuration, runs the command and then drives
/// the event loop until deferred emblem work has finished.
///
/// # Errors
///
/// Returns `EmblemTagsError` if configuration loading fails, the registry
/// cannot be opened, or the command fails.
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    if let Commands::Completions { shell } = &cli.command {
        completions::generate_static(*shell, &mut Cli::command(), &mut io::stdout());
        return Ok(());
    }

    let config_path = EmblemTagsConfig::config_path()?;
    let config = EmblemTagsConfig::load_from(&config_path)?;
    let quiet = cli.quiet || config.quiet;

    if let Commands::Config { command } = &cli.command {
        return commands::config::execute(config, &config_path, command, quiet);
    }

    let event_loop = Arc::new(EventLoop::new());
    let mut session = open_session(&config, &event_loop)?;

    match &cli.command {
        Commands::Tag { command } => commands::tag::execute(&mut session, command, quiet)?,
        Commands::Assign { tag, files } => commands::assign::assign(&mut session, tag, files, quiet)?,
        Commands::Unassign { tag, files } => commands::assign::unassign(&mut session, tag, files, quiet)?,
        Commands::Files { tag } => commands::assign::files(&session, tag, quiet)?,
        Commands::TagsFor { file } => commands::assign::tags_for(&session, file, quiet)?,
        Commands::View { tag, open } => commands::view::execute(&session, tag, *open, quiet)?,
        Commands::Emblem {
            command: Some(EmblemCommands::File { path }),
            ..
        } => commands::emblem::file(&session, path, quiet)?,
        Commands::Emblem { command: None, colors } => commands::emblem::colors(&session, colors, quiet)?,
        Commands::Pregenerate => commands::emblem::pregenerate(&session, quiet),
        Commands::PurgeColor { color } => commands::emblem::purge_color(&session, color, quiet),
        Commands::Refresh => commands::emblem::refresh(&session, quiet),
        Commands::Config { .. } | Commands::Completions { .. } => unreachable!(),
    }

    event_loop.run_until_idle(true);
    Ok(())
}
