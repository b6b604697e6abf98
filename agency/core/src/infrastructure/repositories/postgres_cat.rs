// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Cat Repository
//!
//! `CatRepository` backed by the `cats` table. The `mission_id` of a cat is
//! not stored on the row; it is derived from the lowest-id open mission that
//! references the cat.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::cat::{Cat, CatId, NewCat};
use crate::domain::mission::MissionId;
use crate::domain::repository::{CatRepository, RepositoryError};

const SELECT_CAT: &str = r#"
    SELECT
        c.id, c.name, c.years_of_experience, c.breed, c.salary,
        (
            SELECT m.id FROM missions m
            WHERE m.cat_id = c.id AND NOT m.is_completed
            ORDER BY m.id
            LIMIT 1
        ) AS mission_id
    FROM cats c
"#;

pub struct PostgresCatRepository {
    pool: PgPool,
}

impl PostgresCatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn cat_from_row(row: &PgRow) -> Result<Cat, sqlx::Error> {
    let mission_id: Option<i64> = row.try_get("mission_id")?;
    Ok(Cat {
        id: CatId(row.try_get("id")?),
        name: row.try_get("name")?,
        years_of_experience: row.try_get("years_of_experience")?,
        breed: row.try_get("breed")?,
        salary: row.try_get("salary")?,
        mission_id: mission_id.map(MissionId),
    })
}

#[async_trait]
impl CatRepository for PostgresCatRepository {
    async fn create(&self, cat: &NewCat) -> Result<CatId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cats (name, years_of_experience, breed, salary)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&cat.name)
        .bind(cat.years_of_experience)
        .bind(&cat.breed)
        .bind(cat.salary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert cat: {}", e)))?;

        Ok(CatId(id))
    }

    async fn remove(&self, id: CatId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cats WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::CatNotFound(id));
        }
        Ok(())
    }

    async fn update_salary(&self, id: CatId, salary: f64) -> Result<Cat, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE cats SET salary = $1 WHERE id = $2")
            .bind(salary)
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::CatNotFound(id));
        }

        let row = sqlx::query(&format!("{} WHERE c.id = $1", SELECT_CAT))
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        let cat = cat_from_row(&row)?;

        tx.commit().await?;
        Ok(cat)
    }

    async fn list(&self) -> Result<Vec<Cat>, RepositoryError> {
        let rows = sqlx::query(&format!("{} ORDER BY c.id", SELECT_CAT))
            .fetch_all(&self.pool)
            .await?;

        let mut cats = Vec::with_capacity(rows.len());
        for row in &rows {
            cats.push(cat_from_row(row)?);
        }
        Ok(cats)
    }

    async fn get(&self, id: CatId) -> Result<Cat, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE c.id = $1", SELECT_CAT))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(cat_from_row(&row)?),
            None => Err(RepositoryError::CatNotFound(id)),
        }
    }
}
