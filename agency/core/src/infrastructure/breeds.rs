// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Breed Reference Cache
//!
//! Keeps the set of valid breed names fetched from an external breed API
//! (`GET <endpoint>` → `[{"id": "...", "name": "..."}]`).
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Serve breed membership checks for cat validation
//! - **Integration:** External HTTP API → in-memory set → `BreedCatalog`
//!
//! # Concurrency
//!
//! The network fetch and JSON decode run without holding any lock. Only the
//! final swap of the whole set takes the write guard, so readers never see a
//! partially built set and are not blocked while the request is in flight.
//! A failed fetch leaves the current set untouched.

use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::breeds::BreedCatalog;
use crate::infrastructure::config::BreedsConfig;

// Only the name is used; other fields of the upstream record are ignored
#[derive(Debug, Clone, Deserialize)]
struct Breed {
    name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BreedFetchError {
    #[error("Error executing breeds API request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Breeds API responded with HTTP {0}")]
    Status(StatusCode),

    #[error("Error decoding breeds API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Error building breeds HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

pub struct BreedCache {
    endpoint: String,
    client: Client,
    names: RwLock<HashSet<String>>,
}

impl BreedCache {
    /// Build the cache and perform the first fetch; fails if that fetch fails.
    pub async fn connect(config: &BreedsConfig) -> Result<Self, BreedFetchError> {
        let cache = Self::empty(&config.endpoint, config.timeout)?;
        cache.refresh().await?;
        Ok(cache)
    }

    /// A cache that has not fetched anything yet
    pub fn empty(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BreedFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BreedFetchError::Client)?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            names: RwLock::new(HashSet::new()),
        })
    }

    /// A cache pre-populated with `names` (no endpoint configured)
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint: String::new(),
            client: Client::new(),
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Re-fetch the breed list and replace the whole set; returns the new size.
    pub async fn refresh(&self) -> Result<usize, BreedFetchError> {
        let names = match self.fetch().await {
            Ok(names) => names,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Breed refresh failed, keeping cached set");
                return Err(e);
            }
        };

        let count = names.len();
        let _previous = std::mem::replace(&mut *self.names.write(), names);

        info!(breeds = count, "Breeds cache populated");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    async fn fetch(&self) -> Result<HashSet<String>, BreedFetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(BreedFetchError::Request)?;

        if !response.status().is_success() {
            return Err(BreedFetchError::Status(response.status()));
        }

        let breeds: Vec<Breed> = response.json().await.map_err(BreedFetchError::Decode)?;

        Ok(breeds.into_iter().map(|b| b.name).collect())
    }
}

impl BreedCatalog for BreedCache {
    fn exists(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }
}
