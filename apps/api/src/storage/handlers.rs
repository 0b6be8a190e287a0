//! Axum route handlers for presigned upload and download URLs.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::storage::download::presign_download;
use crate::storage::post_policy::PresignedPost;
use crate::storage::UploadResource;

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub upload_url: PresignedPost,
}

#[derive(Debug, Deserialize)]
pub struct DownloadUrlRequest {
    pub object_key: String,
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadUrlResponse {
    pub download_url: String,
}

/// POST /generate-upload-url/:resource
///
/// Returns the form fields for a direct multipart POST to storage.
pub async fn handle_upload_url(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(resource): Path<String>,
    Json(request): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let resource = UploadResource::parse(&resource)?;
    if request.filename.trim().is_empty() {
        return Err(AppError::Validation("filename cannot be empty".to_string()));
    }
    resource.check_content_type(&request.content_type)?;

    let key = resource.new_object_key(&request.filename);
    let upload_url = state.uploads.sign(
        &key,
        request.content_type.trim(),
        state.config.max_upload_bytes,
        state.config.presign_ttl_secs,
        Utc::now(),
    )?;

    info!("Issued upload policy for {key} to user {}", user.user_id);
    Ok(Json(UploadUrlResponse { upload_url }))
}

/// POST /generate-download-url/:resource
pub async fn handle_download_url(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(resource): Path<String>,
    Json(request): Json<DownloadUrlRequest>,
) -> Result<Json<DownloadUrlResponse>, AppError> {
    let resource = UploadResource::parse(&resource)?;
    resource.check_object_key(&request.object_key)?;

    let download_url = presign_download(
        &state.s3,
        &state.config.s3_bucket,
        &request.object_key,
        &request.filename,
        request.content_type.trim(),
        state.config.presign_ttl_secs,
    )
    .await?;

    Ok(Json(DownloadUrlResponse { download_url }))
}
