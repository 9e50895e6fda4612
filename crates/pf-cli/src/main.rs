use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pf_cli::commands::{export, import, status, timeline, track, transitions};
use pf_cli::{Cli, Commands, Config};

/// Open the configured database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<pf_db::Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    pf_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
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

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Track(args)) => {
            let mut db = open_database(&config)?;
            track::run(&mut db, args, Utc::now())?;
        }
        Some(Commands::Import) => {
            let mut db = open_database(&config)?;
            let inserted = import::run(io::stdin().lock(), &mut db)?;
            eprintln!("Imported {inserted} events");
        }
        Some(Commands::Export) => {
            let db = open_database(&config)?;
            export::run(&mut out, &db)?;
        }
        Some(Commands::Timeline(args)) => {
            let db = open_database(&config)?;
            let timeline_config = config.timeline_config().context("invalid configuration")?;
            timeline::run(&mut out, &db, &timeline_config, args)?;
        }
        Some(Commands::Transitions(args)) => {
            let db = open_database(&config)?;
            let timeline_config = config.timeline_config().context("invalid configuration")?;
            transitions::run(&mut out, &db, &timeline_config, args)?;
        }
        Some(Commands::Status) => {
            let db = open_database(&config)?;
            status::run(&mut out, &db, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
