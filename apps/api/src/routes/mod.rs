pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cover_letter;
use crate::state::AppState;
use crate::storage;
use crate::tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tracked jobs
        .route(
            "/jobs",
            get(tracking::handlers::handle_list_jobs).post(tracking::handlers::handle_create_job),
        )
        .route("/jobs/board", get(tracking::handlers::handle_board))
        .route(
            "/jobs/:id",
            get(tracking::handlers::handle_get_job).patch(tracking::handlers::handle_update_job),
        )
        .route("/jobs/:id/stage", post(tracking::handlers::handle_move_stage))
        // Cover letters
        .route("/generate", post(cover_letter::handlers::handle_generate))
        // Presigned storage URLs
        .route(
            "/generate-upload-url/:resource",
            post(storage::handlers::handle_upload_url),
        )
        .route(
            "/generate-download-url/:resource",
            post(storage::handlers::handle_download_url),
        )
        .with_state(state)
}
