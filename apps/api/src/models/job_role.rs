use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting. Owned by the job-role service; read here for cover letters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRoleRow {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
