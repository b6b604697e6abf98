// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve cats, missions and targets
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresCatRepository** - `cats` table, mission link derived on read
//! - **PostgresMissionRepository** - `missions` + `targets`, one transaction per call
//!
//! ## In-Memory Store
//!
//! - **InMemoryAgencyStore** - implements both traits over a single mutex so
//!   each call is atomic; used by `spycat serve --in-memory` and the tests
//!
//! # Usage
//!
//! ```no_run
//! # async fn run(database_url: &str) -> anyhow::Result<()> {
//! use spycat_core::domain::repository::MissionRepository;
//! use spycat_core::domain::mission::MissionId;
//! use spycat_core::infrastructure::repositories::PostgresMissionRepository;
//!
//! let pool = sqlx::PgPool::connect(database_url).await?;
//! let repo = PostgresMissionRepository::new(pool);
//! let mission = repo.get(MissionId(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod postgres_cat;
pub mod postgres_mission;

pub use postgres_cat::PostgresCatRepository;
pub use postgres_mission::PostgresMissionRepository;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::cat::{Cat, CatId, NewCat};
use crate::domain::mission::{
    ensure_mission_open, ensure_target_capacity, ensure_target_open, ensure_unassigned, Mission,
    MissionId, NewMission, NewTarget, Target, TargetId,
};
use crate::domain::repository::{CatRepository, MissionRepository, RepositoryError};

#[derive(Default)]
struct AgencyState {
    last_cat_id: i64,
    last_mission_id: i64,
    last_target_id: i64,
    cats: BTreeMap<CatId, Cat>,
    missions: BTreeMap<MissionId, Mission>,
}

impl AgencyState {
    /// Cat record with its mission link filled in from the open missions
    fn cat_view(&self, cat: &Cat) -> Cat {
        let mission_id = self
            .missions
            .values()
            .find(|m| m.cat_id == Some(cat.id) && !m.is_completed)
            .map(|m| m.id);
        Cat {
            mission_id,
            ..cat.clone()
        }
    }

    fn mission_mut(&mut self, id: MissionId) -> Result<&mut Mission, RepositoryError> {
        self.missions
            .get_mut(&id)
            .ok_or(RepositoryError::MissionNotFound(id))
    }

    /// Returns `(is_completed, mission_id)` of the target
    fn target_status(&self, id: TargetId) -> Result<(bool, MissionId), RepositoryError> {
        self.missions
            .values()
            .flat_map(|m| m.targets.iter())
            .find(|t| t.id == id)
            .map(|t| (t.is_completed, t.mission_id))
            .ok_or(RepositoryError::TargetNotFound(id))
    }

    fn new_target(&mut self, mission_id: MissionId, target: &NewTarget) -> Target {
        self.last_target_id += 1;
        Target {
            id: TargetId(self.last_target_id),
            mission_id,
            name: target.name.clone(),
            country: target.country.clone(),
            notes: target.notes.clone(),
            is_completed: false,
        }
    }
}

/// Process-local store for cats and missions
#[derive(Clone, Default)]
pub struct InMemoryAgencyStore {
    state: Arc<Mutex<AgencyState>>,
}

impl InMemoryAgencyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatRepository for InMemoryAgencyStore {
    async fn create(&self, cat: &NewCat) -> Result<CatId, RepositoryError> {
        let mut state = self.state.lock();
        state.last_cat_id += 1;
        let id = CatId(state.last_cat_id);
        state.cats.insert(
            id,
            Cat {
                id,
                name: cat.name.clone(),
                years_of_experience: cat.years_of_experience,
                breed: cat.breed.clone(),
                salary: cat.salary,
                mission_id: None,
            },
        );
        Ok(id)
    }

    async fn remove(&self, id: CatId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        if state.cats.remove(&id).is_none() {
            return Err(RepositoryError::CatNotFound(id));
        }
        // Same effect as ON DELETE SET NULL
        for mission in state.missions.values_mut() {
            if mission.cat_id == Some(id) {
                mission.cat_id = None;
            }
        }
        Ok(())
    }

    async fn update_salary(&self, id: CatId, salary: f64) -> Result<Cat, RepositoryError> {
        let mut state = self.state.lock();
        let cat = state.cats.get_mut(&id).ok_or(RepositoryError::CatNotFound(id))?;
        cat.salary = salary;
        let cat = cat.clone();
        Ok(state.cat_view(&cat))
    }

    async fn list(&self) -> Result<Vec<Cat>, RepositoryError> {
        let state = self.state.lock();
        Ok(state.cats.values().map(|c| state.cat_view(c)).collect())
    }

    async fn get(&self, id: CatId) -> Result<Cat, RepositoryError> {
        let state = self.state.lock();
        state
            .cats
            .get(&id)
            .map(|c| state.cat_view(c))
            .ok_or(RepositoryError::CatNotFound(id))
    }
}

#[async_trait]
impl MissionRepository for InMemoryAgencyStore {
    async fn create(&self, mission: &NewMission) -> Result<Mission, RepositoryError> {
        let mut state = self.state.lock();

        let cat_id = mission.cat_id.map(CatId);
        if let Some(cat_id) = cat_id {
            if !state.cats.contains_key(&cat_id) {
                return Err(RepositoryError::CatNotFound(cat_id));
            }
        }

        let id = MissionId(state.last_mission_id + 1);
        ensure_target_capacity(id, 0, mission.targets.len())?;
        state.last_mission_id = id.0;

        let targets = mission
            .targets
            .iter()
            .map(|t| state.new_target(id, t))
            .collect();
        let created = Mission {
            id,
            cat_id,
            is_completed: false,
            created_at: Utc::now(),
            targets,
        };
        state.missions.insert(id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: MissionId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        let mission = state.mission_mut(id)?;
        ensure_unassigned(id, mission.cat_id)?;
        state.missions.remove(&id);
        Ok(())
    }

    async fn complete(&self, id: MissionId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.mission_mut(id)?.is_completed = true;
        Ok(())
    }

    async fn complete_target(&self, id: TargetId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        let (_, mission_id) = state.target_status(id)?;
        let mission = state.mission_mut(mission_id)?;
        ensure_mission_open(mission_id, mission.is_completed)?;
        if let Some(target) = mission.targets.iter_mut().find(|t| t.id == id) {
            target.is_completed = true;
        }
        Ok(())
    }

    async fn update_target_notes(&self, id: TargetId, notes: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        let (target_completed, mission_id) = state.target_status(id)?;
        ensure_target_open(id, target_completed)?;
        let mission = state.mission_mut(mission_id)?;
        ensure_mission_open(mission_id, mission.is_completed)?;
        if let Some(target) = mission.targets.iter_mut().find(|t| t.id == id) {
            target.notes = notes.to_string();
        }
        Ok(())
    }

    async fn delete_target(&self, id: TargetId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        let (target_completed, mission_id) = state.target_status(id)?;
        ensure_target_open(id, target_completed)?;
        let mission = state.mission_mut(mission_id)?;
        ensure_mission_open(mission_id, mission.is_completed)?;
        mission.targets.retain(|t| t.id != id);
        Ok(())
    }

    async fn add_targets(
        &self,
        id: MissionId,
        targets: &[NewTarget],
    ) -> Result<Vec<Target>, RepositoryError> {
        let mut state = self.state.lock();
        let mission = state.mission_mut(id)?;
        ensure_mission_open(id, mission.is_completed)?;
        ensure_target_capacity(id, mission.targets.len(), targets.len())?;

        let added: Vec<Target> = targets.iter().map(|t| state.new_target(id, t)).collect();
        state.mission_mut(id)?.targets.extend(added.iter().cloned());
        Ok(added)
    }

    async fn assign_cat(&self, id: MissionId, cat_id: CatId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.mission_mut(id)?;
        if !state.cats.contains_key(&cat_id) {
            return Err(RepositoryError::CatNotFound(cat_id));
        }
        state.mission_mut(id)?.cat_id = Some(cat_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Mission>, RepositoryError> {
        let state = self.state.lock();
        Ok(state.missions.values().cloned().collect())
    }

    async fn get(&self, id: MissionId) -> Result<Mission, RepositoryError> {
        let state = self.state.lock();
        state
            .missions
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::MissionNotFound(id))
    }
}
