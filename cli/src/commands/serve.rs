// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Serve Command
//!
//! Wires configuration, the breed cache and a repository backend into the
//! axum router and serves it until Ctrl+C or SIGTERM.
//!
//! # Architecture
//!
//! - **Layer:** CLI/Presentation
//! - **Purpose:** Process entry point of the HTTP API
//! - **Integration:** CLI → AgencyConfig → BreedCache + repositories → axum

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use spycat_core::infrastructure::breeds::BreedCache;
use spycat_core::infrastructure::config::AgencyConfig;
use spycat_core::infrastructure::db::Database;
use spycat_core::infrastructure::repositories::{
    InMemoryAgencyStore, PostgresCatRepository, PostgresMissionRepository,
};
use spycat_core::presentation::{app, AppState};

#[derive(Args)]
pub struct ServeCommand {
    /// Keep cats and missions in process memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// Apply pending migrations before accepting requests
    #[arg(long, conflicts_with = "in_memory")]
    migrate: bool,
}

pub async fn execute(cmd: ServeCommand, config_path: Option<PathBuf>) -> Result<()> {
    let config = AgencyConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let breeds = Arc::new(
        BreedCache::connect(&config.breeds)
            .await
            .with_context(|| format!("Failed to load breeds from {}", config.breeds.endpoint))?,
    );

    let mut database = None;
    let state = if cmd.in_memory {
        warn!("Using in-memory store, all data is lost on shutdown");
        let store = Arc::new(InMemoryAgencyStore::new());
        AppState::new(store.clone(), store, breeds)
    } else {
        config.validate_database()?;
        let db = Database::connect(&config.database).await?;
        info!(
            max_connections = config.database.max_connections,
            "Connected to PostgreSQL"
        );

        if cmd.migrate {
            db.run_migrations().await?;
            info!("Database migrations applied");
        }

        let state = AppState::new(
            Arc::new(PostgresCatRepository::new(db.get_pool().clone())),
            Arc::new(PostgresMissionRepository::new(db.get_pool().clone())),
            breeds,
        );
        database = Some(db);
        state
    };

    let addr = config.server.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Spy cat agency listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(db) = database {
        db.get_pool().close().await;
    }
    info!("Spy cat agency shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
