// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::breeds::BreedCatalog;
use crate::domain::mission::MissionId;
use crate::domain::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatId(pub i64);

impl fmt::Display for CatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted spy cat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Cat {
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub id: CatId,
    pub name: String,
    pub years_of_experience: i16,
    pub breed: String,
    pub salary: f64,
    /// Open mission the cat is currently assigned to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>))]
    pub mission_id: Option<MissionId>,
}

/// Payload for hiring a new cat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewCat {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "yoe")]
    pub years_of_experience: i16,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub salary: f64,
}

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const MAX_YEARS_OF_EXPERIENCE: i16 = 99;

impl NewCat {
    /// Checks field constraints and breed membership.
    pub fn validate(&self, breeds: &dyn BreedCatalog) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();

        v.check(!self.name.trim().is_empty(), "name", "can't be empty");
        v.check(
            within_len(&self.name, NAME_MIN_LEN, NAME_MAX_LEN),
            "name",
            "must be between 2 and 50 characters",
        );
        v.check(
            (0..=MAX_YEARS_OF_EXPERIENCE).contains(&self.years_of_experience),
            "years_of_experience",
            "must be between 0 and 99",
        );
        v.check(!self.breed.trim().is_empty(), "breed", "can't be empty");
        v.check(
            within_len(&self.breed, NAME_MIN_LEN, NAME_MAX_LEN),
            "breed",
            "must be between 2 and 50 characters",
        );
        v.check(breeds.exists(&self.breed), "breed", "invalid breed");
        v.check(self.salary != 0.0, "salary", "can't be empty");
        v.check(self.salary > 0.0, "salary", "must be positive");

        v.finish()
    }
}

/// Payload for changing the salary of an existing cat
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SalaryUpdate {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub salary: f64,
}

impl SalaryUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(self.id != 0, "id", "id can't be zero");
        v.check(self.id >= 0, "id", "must be positive");
        v.check(self.salary != 0.0, "salary", "can't be empty");
        v.check(self.salary > 0.0, "salary", "must be positive");
        v.finish()
    }
}

pub(crate) fn within_len(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}
