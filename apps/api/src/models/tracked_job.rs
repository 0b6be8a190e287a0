use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pipeline::StageMap;

/// A job seeker's record of progress on one job posting.
///
/// `stage` is stored in a `json` column (not `jsonb`) so key order survives.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackedJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    #[sqlx(json)]
    pub stage: StageMap,
    pub reaction: Option<String>,
    pub is_favourite: bool,
    pub notes: Option<String>,
    pub activity: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
