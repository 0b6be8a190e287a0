//! Axum route handlers for the tracked-job API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tracked_job::TrackedJob;
use crate::pipeline::board::{build_board, Board};
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::tracking::sync::{
    self, CreateTrackedJobRequest, MoveStageRequest, MoveStageResponse, UpdateTrackedJobRequest,
};

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TrackedJob>>, AppError> {
    let jobs = sync::list_tracked_jobs(&state.db, &state.cache, user.user_id).await?;
    Ok(Json(jobs))
}

/// GET /jobs/board
///
/// Kanban columns keyed by each job's furthest completed stage.
pub async fn handle_board(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Board>, AppError> {
    let jobs = sync::list_tracked_jobs(&state.db, &state.cache, user.user_id).await?;
    Ok(Json(build_board(&jobs)))
}

/// GET /jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TrackedJob>, AppError> {
    let job = sync::get_tracked_job(&state.db, user.user_id, id).await?;
    Ok(Json(job))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTrackedJobRequest>,
) -> Result<(StatusCode, Json<TrackedJob>), AppError> {
    let job = sync::create_tracked_job(&state.db, &state.cache, user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PATCH /jobs/:id
///
/// Partial update. A `stage` map must be gap-free; if it fills the hired slot the
/// previous current job is archived in the same transaction.
pub async fn handle_update_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTrackedJobRequest>,
) -> Result<Json<TrackedJob>, AppError> {
    let job = sync::update_tracked_job(&state.db, &state.cache, user.user_id, id, request).await?;
    Ok(Json(job))
}

/// POST /jobs/:id/stage
pub async fn handle_move_stage(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveStageRequest>,
) -> Result<Json<MoveStageResponse>, AppError> {
    if request.stage.trim().is_empty() {
        return Err(AppError::Validation("stage cannot be empty".to_string()));
    }
    let response =
        sync::move_stage(&state.db, &state.cache, user.user_id, id, &request.stage).await?;
    Ok(Json(response))
}
