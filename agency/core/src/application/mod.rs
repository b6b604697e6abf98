// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application Services
//!
//! Use cases of the agency. Each service validates its payload, then forwards
//! to the repository it was constructed with.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Purpose:** Validation-before-write and logging around repository calls
//! - **Integration:** Presentation → services → domain repository traits

pub mod cats;
pub mod error;
pub mod missions;

pub use cats::CatService;
pub use error::ServiceError;
pub use missions::MissionService;
