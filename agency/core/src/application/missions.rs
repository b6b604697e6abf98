// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mission Application Service
//!
//! Validates mission and target payloads, then delegates to the
//! [`MissionRepository`], which enforces the completion, capacity and
//! assignment rules atomically.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::error::ServiceError;
use crate::domain::cat::CatId;
use crate::domain::mission::{
    CatAssignment, Mission, MissionId, NewMission, NotesUpdate, Target, TargetId, TargetsAddition,
};
use crate::domain::repository::MissionRepository;
use crate::domain::validation::validate_id;

pub struct MissionService {
    repository: Arc<dyn MissionRepository>,
}

impl MissionService {
    pub fn new(repository: Arc<dyn MissionRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, mission: &NewMission) -> Result<Mission, ServiceError> {
        mission.validate()?;

        let created = self.repository.create(mission).await?;
        info!(
            mission_id = %created.id,
            targets = created.targets.len(),
            cat_id = ?created.cat_id.map(|c| c.0),
            "Mission created"
        );
        Ok(created)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        validate_id(id)?;

        self.repository.delete(MissionId(id)).await?;
        info!(mission_id = id, "Mission deleted");
        Ok(())
    }

    pub async fn complete(&self, id: i64) -> Result<(), ServiceError> {
        validate_id(id)?;

        self.repository.complete(MissionId(id)).await?;
        info!(mission_id = id, "Mission completed");
        Ok(())
    }

    pub async fn complete_target(&self, id: i64) -> Result<(), ServiceError> {
        validate_id(id)?;

        self.repository.complete_target(TargetId(id)).await?;
        info!(target_id = id, "Target completed");
        Ok(())
    }

    pub async fn update_target_notes(&self, update: &NotesUpdate) -> Result<(), ServiceError> {
        update.validate()?;

        self.repository
            .update_target_notes(TargetId(update.id), &update.notes)
            .await?;
        debug!(target_id = update.id, "Target notes updated");
        Ok(())
    }

    pub async fn delete_target(&self, id: i64) -> Result<(), ServiceError> {
        validate_id(id)?;

        self.repository.delete_target(TargetId(id)).await?;
        info!(target_id = id, "Target deleted");
        Ok(())
    }

    pub async fn add_targets(&self, addition: &TargetsAddition) -> Result<Vec<Target>, ServiceError> {
        addition.validate()?;

        let added = self
            .repository
            .add_targets(MissionId(addition.id), &addition.targets)
            .await?;
        info!(mission_id = addition.id, added = added.len(), "Targets added");
        Ok(added)
    }

    pub async fn assign_cat(&self, assignment: &CatAssignment) -> Result<(), ServiceError> {
        assignment.validate()?;

        // validate() rejects a missing cat_id
        let cat_id = CatId(assignment.cat_id.unwrap_or_default());
        self.repository
            .assign_cat(MissionId(assignment.id), cat_id)
            .await?;
        info!(mission_id = assignment.id, cat_id = %cat_id, "Cat assigned to mission");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Mission>, ServiceError> {
        let missions = self.repository.list().await?;
        debug!(count = missions.len(), "Listed missions");
        Ok(missions)
    }

    pub async fn get(&self, id: i64) -> Result<Mission, ServiceError> {
        validate_id(id)?;
        Ok(self.repository.get(MissionId(id)).await?)
    }
}
