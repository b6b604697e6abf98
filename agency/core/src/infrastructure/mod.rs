// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod breeds;
pub mod config;
pub mod db;
pub mod repositories;

pub use breeds::{BreedCache, BreedFetchError};
pub use config::AgencyConfig;
pub use db::Database;
