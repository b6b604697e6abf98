// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Missions and Targets
//!
//! A mission owns up to [`MAX_TARGETS_PER_MISSION`] targets and may be
//! assigned to one cat. Both missions and targets move `open → completed`
//! and never back.
//!
//! The guard functions at the bottom of this module are the single source of
//! the completion and capacity rules; every `MissionRepository`
//! implementation calls them inside its transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::cat::{within_len, CatId, NAME_MAX_LEN, NAME_MIN_LEN};
use crate::domain::repository::RepositoryError;
use crate::domain::validation::{ValidationErrors, Validator};

pub const MAX_TARGETS_PER_MISSION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub i64);

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub i64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Mission {
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub id: MissionId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>))]
    pub cat_id: Option<CatId>,
    pub is_completed: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: DateTime<Utc>,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Target {
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub id: TargetId,
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub mission_id: MissionId,
    pub name: String,
    pub country: String,
    pub notes: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewTarget {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub notes: String,
}

impl NewTarget {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(!self.name.trim().is_empty(), "name", "can't be empty");
        v.check(
            within_len(&self.name, NAME_MIN_LEN, NAME_MAX_LEN),
            "name",
            "must be between 2 and 50 characters",
        );
        v.check(!self.country.trim().is_empty(), "country", "can't be empty");
        v.check(
            within_len(&self.country, NAME_MIN_LEN, NAME_MAX_LEN),
            "country",
            "must be between 2 and 50 characters",
        );
        v.finish()
    }
}

/// Payload for `POST /missions/create`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewMission {
    #[serde(default)]
    pub cat_id: Option<i64>,
    #[serde(default)]
    pub targets: Vec<NewTarget>,
}

impl NewMission {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(cat_id) = self.cat_id {
            v.check(cat_id > 0, "cat_id", "must be positive");
        }
        validate_targets(&mut v, &self.targets);
        v.finish()
    }
}

/// Payload for `PUT /missions/add_targets`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TargetsAddition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub targets: Vec<NewTarget>,
}

impl TargetsAddition {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(self.id > 0, "id", "id can't be zero");
        validate_targets(&mut v, &self.targets);
        v.finish()
    }
}

/// Payload for `PUT /missions/assign`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatAssignment {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub cat_id: Option<i64>,
}

impl CatAssignment {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(self.id > 0, "id", "id can't be zero");
        match self.cat_id {
            Some(cat_id) => v.check(cat_id > 0, "cat_id", "id can't be zero"),
            None => v.check(false, "cat_id", "required"),
        }
        v.finish()
    }
}

/// Payload for `PUT /missions/update_notes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotesUpdate {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub notes: String,
}

impl NotesUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(self.id > 0, "id", "id can't be zero");
        v.check(!self.notes.trim().is_empty(), "notes", "can't be empty");
        v.finish()
    }
}

fn validate_targets(v: &mut Validator, targets: &[NewTarget]) {
    v.check(!targets.is_empty(), "targets", "at least one target is required");
    v.check(
        targets.len() <= MAX_TARGETS_PER_MISSION,
        "targets",
        "a mission can't have more than 3 targets",
    );
    for (i, target) in targets.iter().enumerate() {
        if let Err(nested) = target.validate() {
            v.merge_nested(&format!("targets[{}]", i), nested);
        }
    }
}

// ============================================================================
// Transactional guards
// ============================================================================

pub fn ensure_mission_open(mission_id: MissionId, is_completed: bool) -> Result<(), RepositoryError> {
    if is_completed {
        return Err(RepositoryError::MissionCompleted(mission_id));
    }
    Ok(())
}

pub fn ensure_target_open(target_id: TargetId, is_completed: bool) -> Result<(), RepositoryError> {
    if is_completed {
        return Err(RepositoryError::TargetCompleted(target_id));
    }
    Ok(())
}

pub fn ensure_target_capacity(
    mission_id: MissionId,
    existing: usize,
    adding: usize,
) -> Result<(), RepositoryError> {
    if existing + adding > MAX_TARGETS_PER_MISSION {
        return Err(RepositoryError::TooManyTargets {
            mission_id,
            existing,
            requested: adding,
        });
    }
    Ok(())
}

pub fn ensure_unassigned(mission_id: MissionId, cat_id: Option<CatId>) -> Result<(), RepositoryError> {
    match cat_id {
        Some(cat_id) => Err(RepositoryError::CatAssigned { mission_id, cat_id }),
        None => Ok(()),
    }
}
