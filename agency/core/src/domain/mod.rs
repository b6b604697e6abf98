// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Aggregates, payload validation and repository contracts of the agency.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Cats, missions and targets, plus the rules that guard them

pub mod breeds;
pub mod cat;
pub mod mission;
pub mod repository;
pub mod validation;
