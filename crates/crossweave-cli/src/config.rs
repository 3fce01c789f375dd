//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use crossweave_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Loaded from TOML; every field has a default, so an empty file (or none at
/// all) yields a working setup:
///
/// ```toml
/// db_path = "crossweave.db"
/// spool_dir = "spool"
///
/// [settings]
/// format = "table"
///
/// [engine]
/// update_interval_minutes = 360
/// max_domains_per_cycle = 5
/// min_confidence_threshold = 0.7
/// active_domains = ["scientific_research", "technology_news"]
///
/// [engine.relationship_priors]
/// "scientific_research->technology_news" = 0.8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Directory scanned for candidate payloads, one subdirectory per domain
    pub spool_dir: PathBuf,

    /// Global settings
    pub settings: Settings,

    /// Engine configuration
    pub engine: EngineConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".crossweave").join("config.toml"))
    }

    /// Load configuration from the given path, or from the default location.
    ///
    /// A missing file is not an error; defaults apply. An explicit path that
    /// does not exist is an error, since the user asked for that file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Ok(toml::from_str(&contents)?)
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    let contents = fs::read_to_string(&path)?;
                    Ok(toml::from_str(&contents)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("crossweave.db"),
            spool_dir: PathBuf::from("spool"),
            settings: Settings::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}
