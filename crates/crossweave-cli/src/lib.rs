//! Crossweave CLI library.
//!
//! Core functionality for the crossweave command-line interface: argument
//! parsing, configuration loading, the spool-directory collector, command
//! execution, and output formatting.

pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use collector::SpoolCollector;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
