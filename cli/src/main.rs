// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Spy Cat Agency CLI
//!
//! The `spycat` binary runs the agency HTTP API and the operator tasks around it.
//!
//! ## Commands
//!
//! - `spycat serve [--in-memory] [--migrate]` - Serve the HTTP API
//! - `spycat migrate [--dry-run]` - Apply pending database migrations
//! - `spycat config show|validate` - Configuration management
//! - `spycat health` - Probe a running server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use spycat_agency::commands::{self, ConfigCommand, HealthCommand, MigrateCommand, ServeCommand};
use spycat_core::infrastructure::config::{AgencyConfig, CONFIG_PATH_ENV};

/// Spy Cat Agency - cats, missions and targets over HTTP
#[derive(Parser)]
#[command(name = "spycat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to logging.level
    #[arg(long, global = true, env = "SPYCAT_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },

    /// Apply database migrations
    #[command(name = "migrate")]
    Migrate {
        #[command(flatten)]
        command: MigrateCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Check that a server answers its health endpoint
    #[command(name = "health")]
    Health {
        #[command(flatten)]
        command: HealthCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = match cli.log_level.clone() {
        Some(level) => level,
        None => AgencyConfig::load_or_default(cli.config.clone())
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string()),
    };
    init_logging(&level)?;

    match cli.command {
        Commands::Serve { command } => commands::serve::execute(command, cli.config).await,
        Commands::Migrate { command } => commands::migrate::execute(command, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Health { command } => commands::health::execute(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
