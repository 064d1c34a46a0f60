use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use mt_core::{Calendar, Period, SessionStore, Tracker};
use mt_db::Database;
use tracing_subscriber::EnvFilter;

use mt_cli::commands::{calendar, delete, history, report, start, status, stop, switch, util, watch};
use mt_cli::{Cli, Commands, Config, TerminalSink};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database_path.display()
        )
    })?;
    Ok((db, config))
}

fn build_tracker(
    db: Database,
    config: &Config,
    live: bool,
) -> Tracker<Database, TerminalSink<io::Stderr>> {
    Tracker::new(db, TerminalSink::stderr(live)).with_switch_policy(config.switch_policy)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let cal = Calendar::new(Local, config.first_weekday);
    let now = Utc::now();
    let mut out = io::stdout().lock();

    match command {
        Commands::Start {
            activity_type,
            description,
        } => {
            let mut tracker = build_tracker(db, &config, config.live_updates);
            start::run(&mut out, &mut tracker, activity_type, &description, now)?;
        }
        Commands::Quick { title } => {
            let mut tracker = build_tracker(db, &config, config.live_updates);
            start::quick(&mut out, &mut tracker, title.as_deref(), now)?;
        }
        Commands::Stop { id } => {
            let mut tracker = build_tracker(db, &config, config.live_updates);
            stop::run(&mut out, &mut tracker, id.as_deref(), now)?;
        }
        Commands::Switch { id } => {
            let mut tracker = build_tracker(db, &config, config.live_updates);
            switch::run(&mut out, &mut tracker, id.as_deref())?;
        }
        Commands::Delete { id } => {
            delete::run(&mut out, &mut db, &id)?;
        }
        Commands::Status => {
            let sessions = db.sessions()?;
            status::run(&mut out, &sessions, &cal, now)?;
        }
        Commands::Watch => {
            // Watch always renders, whatever `live_updates` says.
            let tracker = build_tracker(db, &config, true);
            watch::run(&mut out, &tracker)?;
        }
        Commands::Report {
            period,
            date,
            offset,
            json,
        } => {
            let reference = util::resolve_reference(date.as_deref(), period, offset, &cal, now)?;
            report::run(&mut out, &db, &cal, period, reference, json, now)?;
        }
        Commands::Calendar {
            date,
            offset,
            period,
            json,
        } => {
            let reference =
                util::resolve_reference(date.as_deref(), Period::Month, offset, &cal, now)?;
            calendar::run(&mut out, &db, &cal, reference, period, json, now)?;
        }
        Commands::History {
            range,
            activity_type,
            json,
        } => {
            let sessions = db.sessions()?;
            history::run(&mut out, &sessions, range, activity_type, &cal, json, now)?;
        }
    }

    Ok(())
}
