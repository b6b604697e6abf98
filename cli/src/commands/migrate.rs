// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Migrate Command
//!
//! Implements `spycat migrate`, which brings the PostgreSQL schema in line
//! with the migrations embedded in the binary.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! spycat migrate
//!
//! # Preview migrations without applying
//! spycat migrate --dry-run
//! ```
//!
//! The connection string comes from `database.url` or `DB_DSN`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use spycat_core::infrastructure::config::AgencyConfig;
use spycat_core::infrastructure::db::{Database, MIGRATOR};

#[derive(Args)]
pub struct MigrateCommand {
    /// List pending migrations without applying them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: MigrateCommand, config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "Spy Cat Agency Migrate".bold().green());

    let config = AgencyConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config.validate_database()?;

    println!("Connecting to database...");
    let db = Database::connect(&config.database).await?;

    let pending = db.pending_migrations().await?;
    let total = MIGRATOR.iter().count();
    println!(
        "Migration status: {} applied, {} total available.",
        total - pending.len(),
        total
    );

    if pending.is_empty() {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations found (Dry Run):");
        for migration in &pending {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying pending migrations...");
    db.run_migrations().await?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}
