//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crossweave CLI - Operate and inspect the knowledge integration engine.
#[derive(Debug, Parser)]
#[command(name = "crossweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the configured one)
    ///
    /// Long-only: `-d` belongs to the `nodes` domain filter.
    #[arg(long, global = true, env = "CROSSWEAVE_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the integration worker until interrupted
    Run(RunArgs),

    /// Run a single integration cycle and exit
    Cycle,

    /// Show recent integration cycle records
    History(HistoryArgs),

    /// List knowledge nodes
    Nodes(NodesArgs),

    /// Show active domains and their relationship priors
    Domains,

    /// Show recent error log entries
    Errors(ErrorsArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Stop after this many cycles instead of running until Ctrl+C
    #[arg(short = 'n', long)]
    pub cycles: Option<usize>,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Maximum number of records, newest first
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for the nodes command.
#[derive(Debug, Parser)]
pub struct NodesArgs {
    /// Filter by domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Minimum confidence
    #[arg(short, long, default_value = "0.0")]
    pub min_confidence: f64,

    /// Include deactivated nodes
    #[arg(long)]
    pub all: bool,

    /// Maximum number of results
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// Arguments for the errors command.
#[derive(Debug, Parser)]
pub struct ErrorsArgs {
    /// Maximum number of entries, newest first
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
