//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::core::models::Resolution;
use crate::error::{Result, WattError};
use crate::util::parse_utc;

/// WattVault - incremental home energy consumption collector.
#[derive(Parser, Debug)]
#[command(name = "wattvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (human, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch new consumption data into the local store
    Collect(CollectArgs),

    /// Show what the local store contains
    Stats(StatsArgs),
}

/// Arguments for the `collect` command.
#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// API access token
    #[arg(
        long,
        value_name = "TOKEN",
        env = "WATTVAULT_TOKEN",
        hide_env_values = true
    )]
    pub token: String,

    /// Home to collect for (default: first home on the account)
    #[arg(long, value_name = "ID", env = "WATTVAULT_HOME_ID")]
    pub home_id: Option<String>,

    /// Database file (default: platform data directory)
    #[arg(long, value_name = "PATH", env = "WATTVAULT_DB")]
    pub db_path: Option<PathBuf>,

    /// Interval resolution (hourly, daily, weekly, monthly, annual)
    #[arg(long, value_name = "RESOLUTION", default_value = "hourly")]
    pub resolution: String,

    /// Lower bound of the window, ISO-8601 (default: continue from the store)
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Upper bound of the window, ISO-8601 (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub until: Option<String>,

    /// Stop after fetching this many records
    #[arg(long, value_name = "N")]
    pub max_records: Option<usize>,

    /// Engine configuration file
    #[arg(long, value_name = "PATH", env = "WATTVAULT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl CollectArgs {
    /// Validate argument combinations.
    ///
    /// # Errors
    /// Returns an error for an unknown resolution, an unparseable bound,
    /// an inverted window, or a zero record cap.
    pub fn validate(&self) -> Result<()> {
        self.effective_resolution()?;
        let since = self.effective_since()?;
        let until = self.effective_until()?;

        if since.zip(until).is_some_and(|(s, u)| s > u) {
            return Err(WattError::Config(
                "--since must not be after --until".to_string(),
            ));
        }

        if self.max_records == Some(0) {
            return Err(WattError::Config(
                "--max-records must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolution parsed from the CLI argument.
    ///
    /// # Errors
    /// Returns an error for an unknown resolution name.
    pub fn effective_resolution(&self) -> Result<Resolution> {
        Resolution::from_cli_name(&self.resolution).ok_or_else(|| {
            WattError::Config(format!(
                "Unknown resolution '{}'. Valid resolutions: hourly, daily, weekly, monthly, annual",
                self.resolution
            ))
        })
    }

    /// Lower bound parsed from the CLI argument, when given.
    ///
    /// # Errors
    /// Returns an error when the value is not a recognized timestamp.
    pub fn effective_since(&self) -> Result<Option<DateTime<Utc>>> {
        self.since.as_deref().map(parse_utc).transpose()
    }

    /// Upper bound parsed from the CLI argument, when given.
    ///
    /// # Errors
    /// Returns an error when the value is not a recognized timestamp.
    pub fn effective_until(&self) -> Result<Option<DateTime<Utc>>> {
        self.until.as_deref().map(parse_utc).transpose()
    }
}

/// Arguments for the `stats` command.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Database file (default: platform data directory)
    #[arg(long, value_name = "PATH", env = "WATTVAULT_DB")]
    pub db_path: Option<PathBuf>,
}
