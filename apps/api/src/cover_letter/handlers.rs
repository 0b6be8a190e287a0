use axum::{extract::State, Json};

use crate::cover_letter::generator::{generate_cover_letter, GenerateRequest, GenerateResponse};
use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::tracking::repo::get_job_role;

/// POST /generate
///
/// Generates a cover letter for a job role from weighted topics.
pub async fn handle_generate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let props = request.resolve_props()?;

    let role = get_job_role(&state.db, request.job_role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job role {} not found", request.job_role_id)))?;

    let cover_letter = generate_cover_letter(state.writer.as_ref(), &role, &props).await?;

    Ok(Json(GenerateResponse { cover_letter }))
}
