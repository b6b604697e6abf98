// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! PostgreSQL Mission Repository
//!
//! Transactional persistence for missions and their targets.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Enforce mission/target invariants inside one transaction per call
//! - **Integration:** Domain MissionRepository → PostgreSQL `missions` / `targets` tables
//!
//! # Locking
//!
//! Every check-then-write sequence first locks the row that carries the
//! invariant. Locks are always taken cat → mission → target, the same order
//! the `ON DELETE SET NULL` and `ON DELETE CASCADE` actions use, so no two
//! calls can wait on each other:
//! - the mission row is locked `FOR UPDATE` before counting its targets, so
//!   two concurrent `add_targets` calls on one mission serialize and cannot
//!   exceed the cap together;
//! - target edits share-lock the parent mission, which conflicts with a
//!   concurrent `complete` or `delete`, and only then lock the target
//!   `FOR UPDATE`;
//! - assignment share-locks the cat before locking the mission `FOR UPDATE`.
//!
//! Dropping the transaction without `commit` rolls it back, so every early
//! `return Err(..)` leaves the database untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{PgConnection, Row};
use std::collections::HashMap;

use crate::domain::cat::CatId;
use crate::domain::mission::{
    ensure_mission_open, ensure_target_capacity, ensure_target_open, ensure_unassigned, Mission,
    MissionId, NewMission, NewTarget, Target, TargetId,
};
use crate::domain::repository::{MissionRepository, RepositoryError};

pub struct PostgresMissionRepository {
    pool: PgPool,
}

impl PostgresMissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn target_from_row(row: &PgRow) -> Result<Target, sqlx::Error> {
    Ok(Target {
        id: TargetId(row.try_get("id")?),
        mission_id: MissionId(row.try_get("mission_id")?),
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        notes: row.try_get("notes")?,
        is_completed: row.try_get("is_completed")?,
    })
}

fn mission_from_row(row: &PgRow, targets: Vec<Target>) -> Result<Mission, sqlx::Error> {
    let cat_id: Option<i64> = row.try_get("cat_id")?;
    Ok(Mission {
        id: MissionId(row.try_get("id")?),
        cat_id: cat_id.map(CatId),
        is_completed: row.try_get("is_completed")?,
        created_at: row.try_get("created_at")?,
        targets,
    })
}

async fn insert_target(
    conn: &mut PgConnection,
    mission_id: MissionId,
    target: &NewTarget,
) -> Result<Target, RepositoryError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO targets (mission_id, name, country, notes, is_completed)
        VALUES ($1, $2, $3, $4, FALSE)
        RETURNING id
        "#,
    )
    .bind(mission_id.0)
    .bind(&target.name)
    .bind(&target.country)
    .bind(&target.notes)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::Database(format!("Failed to insert target: {}", e)))?;

    Ok(Target {
        id: TargetId(id),
        mission_id,
        name: target.name.clone(),
        country: target.country.clone(),
        notes: target.notes.clone(),
        is_completed: false,
    })
}

/// Locks a target in mission → target order and returns
/// `(is_completed, mission_id, mission_completed)`.
///
/// The parent is looked up without a lock first, then share-locked, then the
/// target is locked and checked to still belong to it. A mission deleted in
/// between took its targets with it, so that case reports the target missing.
async fn lock_target(
    conn: &mut PgConnection,
    target_id: TargetId,
) -> Result<(bool, MissionId, bool), RepositoryError> {
    let mission_id: Option<i64> = sqlx::query_scalar("SELECT mission_id FROM targets WHERE id = $1")
        .bind(target_id.0)
        .fetch_optional(&mut *conn)
        .await?;
    let mission_id = MissionId(mission_id.ok_or(RepositoryError::TargetNotFound(target_id))?);

    let mission_completed = match share_mission(&mut *conn, mission_id).await {
        Err(RepositoryError::MissionNotFound(_)) => {
            return Err(RepositoryError::TargetNotFound(target_id))
        }
        other => other?,
    };

    let is_completed: Option<bool> = sqlx::query_scalar(
        "SELECT is_completed FROM targets WHERE id = $1 AND mission_id = $2 FOR UPDATE",
    )
    .bind(target_id.0)
    .bind(mission_id.0)
    .fetch_optional(&mut *conn)
    .await?;
    let is_completed = is_completed.ok_or(RepositoryError::TargetNotFound(target_id))?;

    Ok((is_completed, mission_id, mission_completed))
}

/// Share-locks the mission row and returns its completion flag
async fn share_mission(
    conn: &mut PgConnection,
    mission_id: MissionId,
) -> Result<bool, RepositoryError> {
    let is_completed: Option<bool> =
        sqlx::query_scalar("SELECT is_completed FROM missions WHERE id = $1 FOR SHARE")
            .bind(mission_id.0)
            .fetch_optional(conn)
            .await?;

    is_completed.ok_or(RepositoryError::MissionNotFound(mission_id))
}

async fn cat_exists(conn: &mut PgConnection, cat_id: CatId) -> Result<bool, RepositoryError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM cats WHERE id = $1 FOR SHARE")
        .bind(cat_id.0)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

#[async_trait]
impl MissionRepository for PostgresMissionRepository {
    async fn create(&self, mission: &NewMission) -> Result<Mission, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cat_id = mission.cat_id.map(CatId);
        if let Some(cat_id) = cat_id {
            if !cat_exists(&mut tx, cat_id).await? {
                return Err(RepositoryError::CatNotFound(cat_id));
            }
        }

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO missions (cat_id, is_completed, created_at)
            VALUES ($1, FALSE, NOW())
            RETURNING id, created_at
            "#,
        )
        .bind(cat_id.map(|c| c.0))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert mission: {}", e)))?;
        let mission_id = MissionId(id);

        ensure_target_capacity(mission_id, 0, mission.targets.len())?;

        let mut targets = Vec::with_capacity(mission.targets.len());
        for target in &mission.targets {
            targets.push(insert_target(&mut tx, mission_id, target).await?);
        }

        tx.commit().await?;

        Ok(Mission {
            id: mission_id,
            cat_id,
            is_completed: false,
            created_at,
            targets,
        })
    }

    async fn delete(&self, id: MissionId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cat_id: Option<Option<i64>> =
            sqlx::query_scalar("SELECT cat_id FROM missions WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;
        let cat_id = cat_id.ok_or(RepositoryError::MissionNotFound(id))?;

        ensure_unassigned(id, cat_id.map(CatId))?;

        // Targets go with it through ON DELETE CASCADE
        sqlx::query("DELETE FROM missions WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn complete(&self, id: MissionId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM missions WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(RepositoryError::MissionNotFound(id));
        }

        sqlx::query("UPDATE missions SET is_completed = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn complete_target(&self, id: TargetId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (target_completed, mission_id, mission_completed) = lock_target(&mut tx, id).await?;
        ensure_mission_open(mission_id, mission_completed)?;

        if !target_completed {
            sqlx::query("UPDATE targets SET is_completed = TRUE WHERE id = $1")
                .bind(id.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_target_notes(&self, id: TargetId, notes: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Target completion is reported before mission completion
        let (target_completed, mission_id, mission_completed) = lock_target(&mut tx, id).await?;
        ensure_target_open(id, target_completed)?;
        ensure_mission_open(mission_id, mission_completed)?;

        sqlx::query("UPDATE targets SET notes = $1 WHERE id = $2")
            .bind(notes)
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_target(&self, id: TargetId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (target_completed, mission_id, mission_completed) = lock_target(&mut tx, id).await?;
        ensure_target_open(id, target_completed)?;
        ensure_mission_open(mission_id, mission_completed)?;

        sqlx::query("DELETE FROM targets WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn add_targets(
        &self,
        id: MissionId,
        targets: &[NewTarget],
    ) -> Result<Vec<Target>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let is_completed: Option<bool> =
            sqlx::query_scalar("SELECT is_completed FROM missions WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;
        let is_completed = is_completed.ok_or(RepositoryError::MissionNotFound(id))?;
        ensure_mission_open(id, is_completed)?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM targets WHERE mission_id = $1")
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        ensure_target_capacity(id, existing as usize, targets.len())?;

        let mut inserted = Vec::with_capacity(targets.len());
        for target in targets {
            inserted.push(insert_target(&mut tx, id, target).await?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn assign_cat(&self, id: MissionId, cat_id: CatId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Cat before mission, as `DELETE FROM cats` does through SET NULL.
        // A missing mission is still reported first.
        let cat_found = cat_exists(&mut tx, cat_id).await?;

        let mission: Option<i64> = sqlx::query_scalar("SELECT id FROM missions WHERE id = $1 FOR UPDATE")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if mission.is_none() {
            return Err(RepositoryError::MissionNotFound(id));
        }
        if !cat_found {
            return Err(RepositoryError::CatNotFound(cat_id));
        }

        sqlx::query("UPDATE missions SET cat_id = $1 WHERE id = $2")
            .bind(cat_id.0)
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Mission>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        // One snapshot for both queries
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mission_rows = sqlx::query(
            "SELECT id, cat_id, is_completed, created_at FROM missions ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let target_rows = sqlx::query(
            r#"
            SELECT id, mission_id, name, country, notes, is_completed
            FROM targets
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut by_mission: HashMap<MissionId, Vec<Target>> = HashMap::new();
        for row in &target_rows {
            let target = target_from_row(row)?;
            by_mission.entry(target.mission_id).or_default().push(target);
        }

        let mut missions = Vec::with_capacity(mission_rows.len());
        for row in &mission_rows {
            let id = MissionId(row.try_get("id")?);
            let targets = by_mission.remove(&id).unwrap_or_default();
            missions.push(mission_from_row(row, targets)?);
        }
        Ok(missions)
    }

    async fn get(&self, id: MissionId) -> Result<Mission, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query("SELECT id, cat_id, is_completed, created_at FROM missions WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::MissionNotFound(id))?;

        let target_rows = sqlx::query(
            r#"
            SELECT id, mission_id, name, country, notes, is_completed
            FROM targets
            WHERE mission_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.0)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut targets = Vec::with_capacity(target_rows.len());
        for target_row in &target_rows {
            targets.push(target_from_row(target_row)?);
        }
        Ok(mission_from_row(&row, targets)?)
    }
}
