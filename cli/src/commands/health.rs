// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `spycat health` - probe `GET /healthcheck` of a running server

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use spycat_core::infrastructure::config::AgencyConfig;

#[derive(Args)]
pub struct HealthCommand {
    /// Base URL of the server (default: http://127.0.0.1:<server.port>)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Give up after this many seconds
    #[arg(long, default_value = "5")]
    timeout: u64,
}

pub async fn execute(cmd: HealthCommand, config_path: Option<PathBuf>) -> Result<()> {
    let base = match cmd.url {
        Some(url) => url,
        None => {
            let config = AgencyConfig::load_or_default(config_path)
                .context("Failed to load configuration")?;
            format!("http://127.0.0.1:{}", config.server.port)
        }
    };

    probe(&base, Duration::from_secs(cmd.timeout)).await?;
    println!("{} {}", "✓ Healthy:".green(), base);
    Ok(())
}

pub async fn probe(base_url: &str, timeout: Duration) -> Result<()> {
    let url = format!("{}/healthcheck", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Server not reachable at {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Health check failed: {} returned HTTP {}", url, response.status());
    }
    Ok(())
}
