// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cat Application Service
//!
//! Hiring, salary changes and lookups of spy cats. Breed membership is
//! checked against the injected [`BreedCatalog`] before anything is written.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::error::ServiceError;
use crate::domain::breeds::BreedCatalog;
use crate::domain::cat::{Cat, CatId, NewCat, SalaryUpdate};
use crate::domain::repository::CatRepository;
use crate::domain::validation::validate_id;

pub struct CatService {
    repository: Arc<dyn CatRepository>,
    breeds: Arc<dyn BreedCatalog>,
}

impl CatService {
    pub fn new(repository: Arc<dyn CatRepository>, breeds: Arc<dyn BreedCatalog>) -> Self {
        Self { repository, breeds }
    }

    pub async fn create(&self, cat: &NewCat) -> Result<CatId, ServiceError> {
        cat.validate(self.breeds.as_ref())?;

        let id = self.repository.create(cat).await?;
        info!(cat_id = %id, breed = %cat.breed, "Cat hired");
        Ok(id)
    }

    pub async fn remove(&self, id: i64) -> Result<(), ServiceError> {
        validate_id(id)?;

        self.repository.remove(CatId(id)).await?;
        info!(cat_id = id, "Cat removed");
        Ok(())
    }

    /// Returns the record as committed
    pub async fn update_salary(&self, update: &SalaryUpdate) -> Result<Cat, ServiceError> {
        update.validate()?;

        let cat = self
            .repository
            .update_salary(CatId(update.id), update.salary)
            .await?;
        info!(cat_id = update.id, salary = update.salary, "Cat salary updated");
        Ok(cat)
    }

    pub async fn list(&self) -> Result<Vec<Cat>, ServiceError> {
        let cats = self.repository.list().await?;
        debug!(count = cats.len(), "Listed cats");
        Ok(cats)
    }

    pub async fn get(&self, id: i64) -> Result<Cat, ServiceError> {
        validate_id(id)?;
        Ok(self.repository.get(CatId(id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RepositoryError;
    use crate::infrastructure::breeds::BreedCache;
    use crate::infrastructure::repositories::InMemoryAgencyStore;

    fn service() -> CatService {
        CatService::new(
            Arc::new(InMemoryAgencyStore::new()),
            Arc::new(BreedCache::from_names(["Bengal", "Sphynx"])),
        )
    }

    #[tokio::test]
    async fn test_invalid_cat_is_not_persisted() {
        let service = service();
        let cat = NewCat {
            name: "Tom".to_string(),
            years_of_experience: 2,
            breed: "Nonexistent Breed".to_string(),
            salary: 500.0,
        };

        match service.create(&cat).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.get("breed"), Some("invalid breed"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_salary_returns_committed_record() {
        let service = service();
        let id = service
            .create(&NewCat {
                name: "Luna".to_string(),
                years_of_experience: 7,
                breed: "Sphynx".to_string(),
                salary: 900.0,
            })
            .await
            .unwrap();

        let cat = service
            .update_salary(&SalaryUpdate { id: id.0, salary: 1500.5 })
            .await
            .unwrap();
        assert_eq!(cat.salary, 1500.5);
        assert_eq!(service.get(id.0).await.unwrap().salary, 1500.5);
    }

    #[tokio::test]
    async fn test_missing_cat_is_not_found() {
        let service = service();
        assert!(matches!(
            service.remove(42).await,
            Err(ServiceError::Repository(RepositoryError::CatNotFound(CatId(42))))
        ));
        assert!(matches!(service.get(0).await, Err(ServiceError::Validation(_))));
    }
}
