//! Crossweave CLI - Command-line interface for the knowledge integration engine.

use clap::Parser;
use crossweave_cli::{commands, Cli, Command, Config, Formatter};
use crossweave_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> crossweave_cli::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut store = SqliteStore::new(&config.db_path)?;

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, &config, &mut store, &formatter).await?;
        }
        Command::Cycle => {
            commands::execute_cycle(&config, &mut store, &formatter).await?;
        }
        Command::History(args) => {
            commands::execute_history(args, &store, &formatter)?;
        }
        Command::Nodes(args) => {
            commands::execute_nodes(args, &store, &formatter)?;
        }
        Command::Domains => {
            commands::execute_domains(&config, &store, &formatter)?;
        }
        Command::Errors(args) => {
            commands::execute_errors(args, &store, &formatter)?;
        }
    }

    Ok(())
}
