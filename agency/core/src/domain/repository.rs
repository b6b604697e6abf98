// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the two aggregates of the agency, following the
//! DDD Repository pattern: interfaces live in the domain layer and are
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `CatRepository` | `Cat` | `PostgresCatRepository`, `InMemoryAgencyStore` |
//! | `MissionRepository` | `Mission` + `Target` | `PostgresMissionRepository`, `InMemoryAgencyStore` |
//!
//! Every `MissionRepository` operation is atomic: all of its reads and writes
//! commit together or not at all.

use async_trait::async_trait;

use crate::domain::cat::{Cat, CatId, NewCat};
use crate::domain::mission::{
    Mission, MissionId, NewMission, NewTarget, Target, TargetId, MAX_TARGETS_PER_MISSION,
};

/// Repository interface for Cat aggregates
#[async_trait]
pub trait CatRepository: Send + Sync {
    /// Insert a new cat and return its identity
    async fn create(&self, cat: &NewCat) -> Result<CatId, RepositoryError>;

    /// Delete a cat; `CatNotFound` when nothing was deleted
    async fn remove(&self, id: CatId) -> Result<(), RepositoryError>;

    /// Set the salary and return the committed record
    async fn update_salary(&self, id: CatId, salary: f64) -> Result<Cat, RepositoryError>;

    async fn list(&self) -> Result<Vec<Cat>, RepositoryError>;

    async fn get(&self, id: CatId) -> Result<Cat, RepositoryError>;
}

/// Repository interface for Mission aggregates (missions own their targets)
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Insert the mission and all of its targets in one transaction
    async fn create(&self, mission: &NewMission) -> Result<Mission, RepositoryError>;

    /// Delete an unassigned mission, cascading to its targets
    async fn delete(&self, id: MissionId) -> Result<(), RepositoryError>;

    /// Set the completion flag; completing twice is not an error
    async fn complete(&self, id: MissionId) -> Result<(), RepositoryError>;

    /// Set the completion flag of a single target
    async fn complete_target(&self, id: TargetId) -> Result<(), RepositoryError>;

    async fn update_target_notes(&self, id: TargetId, notes: &str) -> Result<(), RepositoryError>;

    async fn delete_target(&self, id: TargetId) -> Result<(), RepositoryError>;

    /// Append targets to an open mission without exceeding the per-mission cap
    async fn add_targets(
        &self,
        id: MissionId,
        targets: &[NewTarget],
    ) -> Result<Vec<Target>, RepositoryError>;

    async fn assign_cat(&self, id: MissionId, cat_id: CatId) -> Result<(), RepositoryError>;

    /// All missions with their targets
    async fn list(&self) -> Result<Vec<Mission>, RepositoryError>;

    /// One mission with its targets
    async fn get(&self, id: MissionId) -> Result<Mission, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Cat with ID {0} doesn't exist")]
    CatNotFound(CatId),

    #[error("Mission with ID {0} doesn't exist")]
    MissionNotFound(MissionId),

    #[error("Target with ID {0} doesn't exist")]
    TargetNotFound(TargetId),

    #[error("Mission {0} is completed, unable to edit")]
    MissionCompleted(MissionId),

    #[error("Target {0} is completed, unable to edit")]
    TargetCompleted(TargetId),

    #[error(
        "Too many targets: mission {mission_id} has {existing}, adding {requested} exceeds the limit of {max}",
        max = MAX_TARGETS_PER_MISSION
    )]
    TooManyTargets {
        mission_id: MissionId,
        existing: usize,
        requested: usize,
    },

    #[error("Mission {mission_id} is assigned to cat {cat_id}, unassign it first")]
    CatAssigned { mission_id: MissionId, cat_id: CatId },

    #[error("Database error: {0}")]
    Database(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CatNotFound(_) | Self::MissionNotFound(_) | Self::TargetNotFound(_)
        )
    }

    /// Completion guards, the target cap and dangling assignments
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::MissionCompleted(_)
                | Self::TargetCompleted(_)
                | Self::TooManyTargets { .. }
                | Self::CatAssigned { .. }
        )
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}
