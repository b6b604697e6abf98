// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`spycat-agency-core`)
//!
//! HTTP surface that translates requests into application service calls.
//! No business logic lives here.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | axum router, shared state, handlers and the OpenAPI document |
//! | [`error`] | Mapping of service failures to status codes and JSON bodies |

pub mod api;
pub mod error;

pub use api::{app, AppState};
#[cfg(feature = "openapi")]
pub use api::{ApiDoc, OPENAPI_PATH};
pub use error::ApiError;
