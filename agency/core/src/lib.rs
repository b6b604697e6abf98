// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Spy Cat Agency core
//!
//! Cats, missions and targets behind an HTTP API.
//!
//! # Architecture
//!
//! - **domain** - entities, payload validation, repository traits and guards
//! - **application** - use-case services
//! - **infrastructure** - configuration, PostgreSQL, breed cache, in-memory store
//! - **presentation** - axum router

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
