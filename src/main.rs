//! wattvault - incremental home energy consumption collector.
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use wattvault::cli::{Cli, Commands};
use wattvault::core::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(logging::level_from_env)
        .unwrap_or_default();
    let log_format = cli
        .log_format
        .as_deref()
        .and_then(logging::LogFormat::from_arg)
        .or_else(logging::format_from_env)
        .unwrap_or_default();
    let log_file = logging::log_file_from_env();
    logging::init(log_level, log_format, log_file, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> wattvault::Result<()> {
    match cli.command {
        None => {
            print_quickstart();
            Ok(())
        }

        Some(Commands::Collect(args)) => wattvault::cli::collect::execute(&args).await,

        Some(Commands::Stats(args)) => wattvault::cli::stats::execute(&args),
    }
}

/// Print quickstart help when no command is given.
fn print_quickstart() {
    println!(
        r#"wattvault - incremental home energy consumption collector

Fetch interval consumption from your metering provider into a local
SQLite store, with daily and monthly rollups.

USAGE:
    wattvault [OPTIONS] <COMMAND>

COMMANDS:
    collect    Fetch new consumption data into the local store
    stats      Show what the local store contains

QUICK START:
    export WATTVAULT_TOKEN=...            # API access token
    wattvault collect                     # First run backfills 90 days
    wattvault collect                     # Later runs fetch only new hours
    wattvault stats                       # Inspect the store

    wattvault collect --since 2024-01-01  # Explicit window
    wattvault collect --resolution daily  # Coarser intervals

For more help: wattvault --help
"#
    );

    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}
