// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the spycat CLI

pub mod config;
pub mod health;
pub mod migrate;
pub mod serve;

pub use self::config::ConfigCommand;
pub use self::health::HealthCommand;
pub use self::migrate::MigrateCommand;
pub use self::serve::ServeCommand;
