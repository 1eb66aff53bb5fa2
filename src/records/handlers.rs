use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    CreateDietRequest, CreateWorkoutRequest, MessageResponse, RangeQuery, RecordCreated,
    UpdateRecordRequest,
};
use super::model::{DateRange, FitnessRecord, RecordKind};
use super::services;
use crate::{error::AppResult, middleware::AuthUser, state::AppState};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts))
        .route("/diet", get(list_diet))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route("/diet", post(create_diet))
        .route("/records/:id", put(update_record).delete(delete_record))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    payload: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RecordCreated>)> {
    let Json(body) = payload?;
    let new = services::new_workout(&username, body)?;
    let record = services::create_record(&state, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordCreated {
            message: "Workout session added",
            record,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_diet(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    payload: Result<Json<CreateDietRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RecordCreated>)> {
    let Json(body) = payload?;
    let new = services::new_diet(&username, body)?;
    let record = services::create_record(&state, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordCreated {
            message: "Dietary intake added",
            record,
        }),
    ))
}

#[instrument(skip(state, query))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> AppResult<Json<Vec<FitnessRecord>>> {
    list_kind(&state, &username, RecordKind::Workout, query).await
}

#[instrument(skip(state, query))]
pub async fn list_diet(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> AppResult<Json<Vec<FitnessRecord>>> {
    list_kind(&state, &username, RecordKind::Diet, query).await
}

async fn list_kind(
    state: &AppState,
    username: &str,
    kind: RecordKind,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> AppResult<Json<Vec<FitnessRecord>>> {
    let Query(q) = query?;
    let range = DateRange::from_bounds(q.start.as_deref(), q.end.as_deref())?;
    let records = services::list_records(state, username, kind, range).await?;
    Ok(Json(records))
}

#[instrument(skip(state, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> AppResult<Json<FitnessRecord>> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let record = services::update_record(&state, &username, id, body).await?;
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    services::delete_record(&state, &username, id).await?;
    Ok(Json(MessageResponse {
        message: format!("Record {id} deleted"),
    }))
}
