//! eventplan CLI: drives the event engine against a local store.
//!
//! Parameters are passed as `key=value` pairs and go through the same form
//! rules a request router would apply before reaching the engine.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventplan_core::{
    init_from_config, open_db, open_db_in_memory, CoreConfig, EventService,
    SqliteEventRepository,
};
use log::warn;
use std::path::PathBuf;

use commands::{CommentCommands, ParticipantCommands, TermCommands};

/// eventplan - event scheduling aggregate engine
#[derive(Parser)]
#[command(name = "eventplan", version, propagate_version = true)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "EVENTPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (in-memory when omitted)
    #[arg(long, global = true, env = "EVENTPLAN_DB")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true, env = "EVENTPLAN_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an event (`title=.. [description=..]`)
    Create {
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Print an event
    Get { id: u64 },
    /// Edit title/description, or set/clear `fixed`
    Put {
        id: u64,
        #[arg(value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Delete an event
    Delete { id: u64 },
    /// Candidate term operations
    #[command(subcommand)]
    Term(TermCommands),
    /// Participant operations
    #[command(subcommand)]
    Participant(ParticipantCommands),
    /// Comment operations
    #[command(subcommand)]
    Comment(CommentCommands),
    /// Check core linkage
    Ping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_from_config(&config.logging).context("failed to start logging")?;

    let conn = match &config.database.path {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let repo = SqliteEventRepository::try_new(&conn)?;
    let service = EventService::new(repo);

    match commands::execute(cli.command, &service) {
        Ok(outcome) => output::print_outcome(&outcome)?,
        Err(err) => match output::engine_error(&err) {
            Some(engine) => {
                warn!(
                    "event=cli_command module=cli status=error error_code={} status_code={}",
                    engine.kind(),
                    engine.status_code()
                );
                output::print_engine_error(engine)?;
                std::process::exit(1);
            }
            None => return Err(err),
        },
    }
    Ok(())
}

/// Config file (if any) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<CoreConfig> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.dir = Some(dir.clone());
    }
    Ok(config)
}
