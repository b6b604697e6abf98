// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mission/target workflow tests against the in-memory store.
//!
//! Exercises the capacity cap, completion guards, assignment checks and
//! cascade semantics through both the repository traits and the services.

use std::sync::Arc;

use spycat_core::application::{CatService, MissionService, ServiceError};
use spycat_core::domain::cat::{CatId, NewCat};
use spycat_core::domain::mission::{
    CatAssignment, MissionId, NewMission, NewTarget, NotesUpdate, TargetId, TargetsAddition,
    MAX_TARGETS_PER_MISSION,
};
use spycat_core::domain::repository::{CatRepository, MissionRepository, RepositoryError};
use spycat_core::infrastructure::breeds::BreedCache;
use spycat_core::infrastructure::repositories::InMemoryAgencyStore;

fn target(name: &str, country: &str) -> NewTarget {
    NewTarget {
        name: name.to_string(),
        country: country.to_string(),
        notes: String::new(),
    }
}

fn services() -> (CatService, MissionService, Arc<InMemoryAgencyStore>) {
    let store = Arc::new(InMemoryAgencyStore::new());
    let breeds = Arc::new(BreedCache::from_names(["Abyssinian", "Bengal", "Siamese"]));
    (
        CatService::new(store.clone(), breeds),
        MissionService::new(store.clone()),
        store,
    )
}

async fn hire(cats: &CatService, name: &str) -> CatId {
    cats.create(&NewCat {
        name: name.to_string(),
        years_of_experience: 5,
        breed: "Siamese".to_string(),
        salary: 2500.0,
    })
    .await
    .unwrap()
}

fn repository_error(result: Result<impl std::fmt::Debug, ServiceError>) -> RepositoryError {
    match result {
        Err(ServiceError::Repository(err)) => err,
        other => panic!("expected repository error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_target_cap_scenario() {
    let store = InMemoryAgencyStore::new();

    let mission = MissionRepository::create(
        &store,
        &NewMission {
            cat_id: None,
            targets: vec![target("A", "X"), target("B", "Y")],
        },
    )
    .await
    .unwrap();
    assert_eq!(mission.targets.len(), 2);
    assert!(!mission.is_completed);
    assert!(mission.targets.iter().all(|t| !t.is_completed && t.mission_id == mission.id));
    assert_ne!(mission.targets[0].id, mission.targets[1].id);

    let err = store
        .add_targets(mission.id, &[target("C", "Z"), target("D", "W")])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::TooManyTargets { existing: 2, requested: 2, .. }));

    let added = store.add_targets(mission.id, &[target("C", "Z")]).await.unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(
        MissionRepository::get(&store, mission.id).await.unwrap().targets.len(),
        MAX_TARGETS_PER_MISSION
    );

    let err = store.add_targets(mission.id, &[target("E", "V")]).await.unwrap_err();
    assert!(matches!(err, RepositoryError::TooManyTargets { existing: 3, .. }));
}

#[tokio::test]
async fn test_create_rejects_four_targets() {
    let (_, missions, store) = services();

    let result = missions
        .create(&NewMission {
            cat_id: None,
            targets: vec![
                target("Alpha", "France"),
                target("Bravo", "Spain"),
                target("Charlie", "Italy"),
                target("Delta", "Greece"),
            ],
        })
        .await;
    match result {
        Err(ServiceError::Validation(errors)) => assert!(errors.get("targets").is_some()),
        other => panic!("expected validation error, got {:?}", other),
    }

    // The repository refuses it too when called directly
    let err = MissionRepository::create(
        store.as_ref(),
        &NewMission {
            cat_id: None,
            targets: vec![target("A", "X"), target("B", "X"), target("C", "X"), target("D", "X")],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::TooManyTargets { .. }));
    assert!(MissionRepository::list(store.as_ref()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_unknown_cat_fails() {
    let (_, missions, _) = services();

    let err = repository_error(
        missions
            .create(&NewMission {
                cat_id: Some(404),
                targets: vec![target("Alpha", "France")],
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::CatNotFound(CatId(404))));
    assert!(missions.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_completed_mission_blocks_target_edits() {
    let (_, missions, _) = services();
    let mission = missions
        .create(&NewMission {
            cat_id: None,
            targets: vec![target("Alpha", "France"), target("Bravo", "Spain")],
        })
        .await
        .unwrap();
    let target_id = mission.targets[0].id;

    missions.complete(mission.id.0).await.unwrap();

    let err = repository_error(
        missions
            .update_target_notes(&NotesUpdate {
                id: target_id.0,
                notes: "new".to_string(),
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::MissionCompleted(id) if id == mission.id));

    let err = repository_error(
        missions
            .add_targets(&TargetsAddition {
                id: mission.id.0,
                targets: vec![target("Charlie", "Italy")],
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::MissionCompleted(_)));

    let err = repository_error(missions.delete_target(target_id.0).await);
    assert!(matches!(err, RepositoryError::MissionCompleted(_)));

    let err = repository_error(missions.complete_target(target_id.0).await);
    assert!(matches!(err, RepositoryError::MissionCompleted(_)));

    // Completing again is not an error
    missions.complete(mission.id.0).await.unwrap();

    let stored = missions.get(mission.id.0).await.unwrap();
    assert!(stored.is_completed);
    assert_eq!(stored.targets.len(), 2);
    assert_eq!(stored.targets[0].notes, "");
}

#[tokio::test]
async fn test_completed_target_is_frozen_regardless_of_mission() {
    let (_, missions, _) = services();
    let mission = missions
        .create(&NewMission {
            cat_id: None,
            targets: vec![target("Alpha", "France"), target("Bravo", "Spain")],
        })
        .await
        .unwrap();
    let done = mission.targets[0].id;
    let open = mission.targets[1].id;

    missions.complete_target(done.0).await.unwrap();
    // Idempotent for an already completed target
    missions.complete_target(done.0).await.unwrap();

    let update = NotesUpdate {
        id: done.0,
        notes: "too late".to_string(),
    };
    let err = repository_error(missions.update_target_notes(&update).await);
    assert!(matches!(err, RepositoryError::TargetCompleted(id) if id == done));

    let err = repository_error(missions.delete_target(done.0).await);
    assert!(matches!(err, RepositoryError::TargetCompleted(_)));

    // Target completion is reported before mission completion
    missions.complete(mission.id.0).await.unwrap();
    let err = repository_error(missions.update_target_notes(&update).await);
    assert!(matches!(err, RepositoryError::TargetCompleted(_)));

    let err = repository_error(
        missions
            .update_target_notes(&NotesUpdate {
                id: open.0,
                notes: "x".to_string(),
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::MissionCompleted(_)));
}

#[tokio::test]
async fn test_notes_and_target_deletion_on_open_mission() {
    let (_, missions, _) = services();
    let mission = missions
        .create(&NewMission {
            cat_id: None,
            targets: vec![target("Alpha", "France"), target("Bravo", "Spain")],
        })
        .await
        .unwrap();
    let first = mission.targets[0].id;
    let second = mission.targets[1].id;

    missions
        .update_target_notes(&NotesUpdate {
            id: first.0,
            notes: "Seen near the harbour".to_string(),
        })
        .await
        .unwrap();
    missions.delete_target(second.0).await.unwrap();

    let stored = missions.get(mission.id.0).await.unwrap();
    assert_eq!(stored.targets.len(), 1);
    assert_eq!(stored.targets[0].notes, "Seen near the harbour");

    let err = repository_error(missions.delete_target(second.0).await);
    assert!(matches!(err, RepositoryError::TargetNotFound(id) if id == second));

    // Freed capacity can be reused
    let added = missions
        .add_targets(&TargetsAddition {
            id: mission.id.0,
            targets: vec![target("Charlie", "Italy"), target("Delta", "Greece")],
        })
        .await
        .unwrap();
    assert_eq!(added.len(), 2);
}

#[tokio::test]
async fn test_assignment_checks_both_sides_before_writing() {
    let (cats, missions, _) = services();
    let cat = hire(&cats, "Tom").await;
    let mission = missions
        .create(&NewMission {
            cat_id: None,
            targets: vec![target("Alpha", "France")],
        })
        .await
        .unwrap();

    let err = repository_error(
        missions
            .assign_cat(&CatAssignment {
                id: 999,
                cat_id: Some(cat.0),
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::MissionNotFound(MissionId(999))));

    let err = repository_error(
        missions
            .assign_cat(&CatAssignment {
                id: mission.id.0,
                cat_id: Some(777),
            })
            .await,
    );
    assert!(matches!(err, RepositoryError::CatNotFound(CatId(777))));
    assert_eq!(missions.get(mission.id.0).await.unwrap().cat_id, None);

    missions
        .assign_cat(&CatAssignment {
            id: mission.id.0,
            cat_id: Some(cat.0),
        })
        .await
        .unwrap();
    assert_eq!(missions.get(mission.id.0).await.unwrap().cat_id, Some(cat));
    assert_eq!(cats.get(cat.0).await.unwrap().mission_id, Some(mission.id));
}

#[tokio::test]
async fn test_delete_refused_while_assigned_then_cascades() {
    let (cats, missions, store) = services();
    let cat = hire(&cats, "Felix").await;
    let mission = missions
        .create(&NewMission {
            cat_id: Some(cat.0),
            targets: vec![target("Alpha", "France"), target("Bravo", "Spain")],
        })
        .await
        .unwrap();

    let err = repository_error(missions.delete(mission.id.0).await);
    assert!(matches!(err, RepositoryError::CatAssigned { cat_id, .. } if cat_id == cat));
    assert!(missions.get(mission.id.0).await.is_ok());

    // Removing the cat clears the assignment
    cats.remove(cat.0).await.unwrap();
    missions.delete(mission.id.0).await.unwrap();

    let err = repository_error(missions.get(mission.id.0).await);
    assert!(matches!(err, RepositoryError::MissionNotFound(_)));
    for t in &mission.targets {
        assert!(matches!(
            store.delete_target(t.id).await,
            Err(RepositoryError::TargetNotFound(_))
        ));
    }
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let (_, missions, _) = services();

    assert!(matches!(
        repository_error(missions.complete(5).await),
        RepositoryError::MissionNotFound(MissionId(5))
    ));
    assert!(matches!(
        repository_error(missions.delete(5).await),
        RepositoryError::MissionNotFound(_)
    ));
    assert!(matches!(
        repository_error(missions.complete_target(8).await),
        RepositoryError::TargetNotFound(TargetId(8))
    ));
    assert!(matches!(
        repository_error(
            missions
                .add_targets(&TargetsAddition {
                    id: 5,
                    targets: vec![target("Alpha", "France")],
                })
                .await
        ),
        RepositoryError::MissionNotFound(_)
    ));
}

#[tokio::test]
async fn test_concurrent_add_targets_never_exceed_cap() {
    let store = Arc::new(InMemoryAgencyStore::new());
    let mission = MissionRepository::create(
        store.as_ref(),
        &NewMission {
            cat_id: None,
            targets: vec![target("Alpha", "France")],
        },
    )
    .await
    .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let id = mission.id;
        handles.push(tokio::spawn(async move {
            store
                .add_targets(id, &[target(&format!("Agent {}", i), "Norway")])
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(RepositoryError::TooManyTargets { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 2);
    let stored = MissionRepository::get(store.as_ref(), mission.id).await.unwrap();
    assert_eq!(stored.targets.len(), MAX_TARGETS_PER_MISSION);
}

#[tokio::test]
async fn test_cat_listing_reflects_open_mission() {
    let (cats, missions, store) = services();
    let busy = hire(&cats, "Busy").await;
    let idle = hire(&cats, "Idle").await;

    let mission = missions
        .create(&NewMission {
            cat_id: Some(busy.0),
            targets: vec![target("Alpha", "France")],
        })
        .await
        .unwrap();

    let listed = CatRepository::list(store.as_ref()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, busy);
    assert_eq!(listed[0].mission_id, Some(mission.id));
    assert_eq!(listed[1].id, idle);
    assert_eq!(listed[1].mission_id, None);
}
