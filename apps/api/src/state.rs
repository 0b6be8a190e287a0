use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::cache::JobCache;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::storage::post_policy::PostPolicySigner;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: JobCache,
    pub s3: S3Client,
    /// Signs browser-POST upload policies.
    pub uploads: PostPolicySigner,
    /// Cover-letter model backend. Default: `LlmClient`.
    pub writer: Arc<dyn TextGenerator>,
    pub config: Config,
}
