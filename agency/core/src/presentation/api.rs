// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP routes of the agency.
//!
//! Handlers only extract the request, call one application service and shape
//! the JSON response; every failure goes through [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::application::{CatService, MissionService};
use crate::domain::cat::{Cat, NewCat, SalaryUpdate};
use crate::domain::mission::{CatAssignment, Mission, NewMission, NotesUpdate, TargetsAddition};
#[cfg(feature = "openapi")]
use crate::domain::mission::{NewTarget, Target};
use crate::domain::repository::{CatRepository, MissionRepository};
use crate::infrastructure::breeds::BreedCache;
use crate::presentation::error::ApiError;

pub struct AppState {
    pub cats: Arc<CatService>,
    pub missions: Arc<MissionService>,
    pub breeds: Arc<BreedCache>,
}

impl AppState {
    pub fn new(
        cat_repository: Arc<dyn CatRepository>,
        mission_repository: Arc<dyn MissionRepository>,
        breeds: Arc<BreedCache>,
    ) -> Self {
        Self {
            cats: Arc::new(CatService::new(cat_repository, breeds.clone())),
            missions: Arc::new(MissionService::new(mission_repository)),
            breeds,
        }
    }
}

/// OpenAPI description of every route, served at [`OPENAPI_PATH`]
#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    info(title = "Spy Cat Agency", description = "Cats, missions and their targets"),
    paths(
        create_cat,
        remove_cat,
        update_salary,
        list_cats,
        get_cat,
        create_mission,
        delete_mission,
        complete_mission,
        complete_target,
        update_target_notes,
        delete_target,
        add_targets,
        assign_cat,
        list_missions,
        get_mission,
        refresh_breeds,
        healthcheck,
    ),
    components(schemas(
        Cat,
        NewCat,
        SalaryUpdate,
        Mission,
        Target,
        NewTarget,
        NewMission,
        TargetsAddition,
        CatAssignment,
        NotesUpdate,
    )),
    tags(
        (name = "cats", description = "Hiring and managing spy cats"),
        (name = "missions", description = "Missions and their targets"),
        (name = "breeds", description = "Breed reference data"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(feature = "openapi")]
pub const OPENAPI_PATH: &str = "/swagger/doc.json";

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/cats/create", post(create_cat))
        .route("/cats/remove/{id}", delete(remove_cat))
        .route("/cats/update_salary", put(update_salary))
        .route("/cats/list", get(list_cats))
        .route("/cats/get/{id}", get(get_cat))
        .route("/missions/create", post(create_mission))
        .route("/missions/delete/{id}", delete(delete_mission))
        .route("/missions/complete/{id}", put(complete_mission))
        .route("/missions/complete_target/{id}", put(complete_target))
        .route("/missions/update_notes", put(update_target_notes))
        .route("/missions/delete_target/{id}", delete(delete_target))
        .route("/missions/add_targets", put(add_targets))
        .route("/missions/assign", put(assign_cat))
        .route("/missions/list", get(list_missions))
        .route("/missions/get/{id}", get(get_mission))
        .route("/breeds/refresh", post(refresh_breeds))
        .route("/healthcheck", get(healthcheck));

    #[cfg(feature = "openapi")]
    let router = router.route(OPENAPI_PATH, get(openapi_document));

    router
        .with_state(Arc::new(state))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}

fn path_id(path: Result<Path<i64>, PathRejection>, message: &str) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request(message))
}

fn success() -> Json<Value> {
    Json(json!({ "info": "success" }))
}

// ============================================================================
// Cats
// ============================================================================

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        post,
        path = "/cats/create",
        tag = "cats",
        request_body = NewCat,
        responses(
            (status = 201, description = "Cat hired"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
        )
    )
)]
async fn create_cat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCat>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(cat) = payload?;
    let id = state.cats.create(&cat).await?;
    Ok((StatusCode::CREATED, Json(json!({ "info": "success", "id": id }))))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        delete,
        path = "/cats/remove/{id}",
        tag = "cats",
        params(("id" = i64, Path, description = "Cat ID")),
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Cat not found"),
        )
    )
)]
async fn remove_cat(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(path, "Invalid cat ID")?;
    state.cats.remove(id).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/cats/update_salary",
        tag = "cats",
        request_body = SalaryUpdate,
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Cat not found"),
        )
    )
)]
async fn update_salary(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SalaryUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = payload?;
    let cat = state.cats.update_salary(&update).await?;
    Ok(Json(json!({ "info": "success", "updated_cat": cat })))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/cats/list",
        tag = "cats",
        responses(
            (status = 200, description = "All cats", body = [Cat]),
        )
    )
)]
async fn list_cats(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Cat>>, ApiError> {
    Ok(Json(state.cats.list().await?))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/cats/get/{id}",
        tag = "cats",
        params(("id" = i64, Path, description = "Cat ID")),
        responses(
            (status = 200, description = "The cat", body = Cat),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Cat not found"),
        )
    )
)]
async fn get_cat(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Cat>, ApiError> {
    let id = path_id(path, "Invalid cat ID")?;
    Ok(Json(state.cats.get(id).await?))
}

// ============================================================================
// Missions
// ============================================================================

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        post,
        path = "/missions/create",
        tag = "missions",
        request_body = NewMission,
        responses(
            (status = 201, description = "Mission created", body = Mission),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Cat not found"),
        )
    )
)]
async fn create_mission(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewMission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mission) = payload?;
    let created = state.missions.create(&mission).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        delete,
        path = "/missions/delete/{id}",
        tag = "missions",
        params(("id" = i64, Path, description = "Mission ID")),
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Mission not found"),
            (status = 409, description = "Mission is assigned to a cat"),
        )
    )
)]
async fn delete_mission(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(path, "Invalid mission ID")?;
    state.missions.delete(id).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/missions/complete/{id}",
        tag = "missions",
        params(("id" = i64, Path, description = "Mission ID")),
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Mission not found"),
        )
    )
)]
async fn complete_mission(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(path, "Invalid mission ID")?;
    state.missions.complete(id).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/missions/complete_target/{id}",
        tag = "missions",
        params(("id" = i64, Path, description = "Target ID")),
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Target not found"),
            (status = 409, description = "Mission is completed"),
        )
    )
)]
async fn complete_target(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(path, "Invalid target ID")?;
    state.missions.complete_target(id).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/missions/update_notes",
        tag = "missions",
        request_body = NotesUpdate,
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Target not found"),
            (status = 409, description = "Target or mission is completed"),
        )
    )
)]
async fn update_target_notes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotesUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = payload?;
    state.missions.update_target_notes(&update).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        delete,
        path = "/missions/delete_target/{id}",
        tag = "missions",
        params(("id" = i64, Path, description = "Target ID")),
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Target not found"),
            (status = 409, description = "Target or mission is completed"),
        )
    )
)]
async fn delete_target(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(path, "Invalid target ID")?;
    state.missions.delete_target(id).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/missions/add_targets",
        tag = "missions",
        request_body = TargetsAddition,
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Mission not found"),
            (status = 409, description = "Mission is completed or would exceed the target limit"),
        )
    )
)]
async fn add_targets(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TargetsAddition>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(addition) = payload?;
    let added = state.missions.add_targets(&addition).await?;
    Ok(Json(json!({ "info": "success", "added_targets": added })))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        put,
        path = "/missions/assign",
        tag = "missions",
        request_body = CatAssignment,
        responses(
            (status = 200, description = "Success"),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Mission or cat not found"),
        )
    )
)]
async fn assign_cat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CatAssignment>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(assignment) = payload?;
    state.missions.assign_cat(&assignment).await?;
    Ok(success())
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/missions/list",
        tag = "missions",
        responses(
            (status = 200, description = "All missions with their targets", body = [Mission]),
        )
    )
)]
async fn list_missions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.missions.list().await?))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/missions/get/{id}",
        tag = "missions",
        params(("id" = i64, Path, description = "Mission ID")),
        responses(
            (status = 200, description = "The mission with its targets", body = Mission),
            (status = 400, description = "Malformed request"),
            (status = 422, description = "Validation failed"),
            (status = 404, description = "Mission not found"),
        )
    )
)]
async fn get_mission(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Mission>, ApiError> {
    let id = path_id(path, "Invalid mission ID")?;
    Ok(Json(state.missions.get(id).await?))
}

// ============================================================================
// Breeds & health
// ============================================================================

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        post,
        path = "/breeds/refresh",
        tag = "breeds",
        responses(
            (status = 200, description = "Success"),
            (status = 502, description = "Breed source unavailable"),
        )
    )
)]
async fn refresh_breeds(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let count = state.breeds.refresh().await?;
    Ok(Json(json!({ "info": "success", "breeds": count })))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/healthcheck",
        tag = "health",
        responses(
            (status = 200, description = "Service is up"),
        )
    )
)]
async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

#[cfg(feature = "openapi")]
async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(ApiDoc::openapi())
}
