//! SQL for tracked jobs and the job roles they point at.
//!
//! Every tracked-job query is scoped by `user_id`. Stage maps are written as
//! JSON text and cast to `json` so the key order is stored verbatim.

use serde_json::Value;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::job_role::JobRoleRow;
use crate::models::tracked_job::TrackedJob;
use crate::pipeline::StageMap;

/// Fields for a new tracked job row.
pub struct InsertParams<'a> {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub stage: &'a StageMap,
    pub reaction: Option<&'a str>,
    pub is_favourite: bool,
    pub notes: Option<&'a str>,
    pub activity: &'a Value,
}

/// Annotation fields of a partial update. `None` leaves the column unchanged.
#[derive(Default)]
pub struct AnnotationPatch<'a> {
    pub reaction: Option<&'a str>,
    pub is_favourite: Option<bool>,
    pub notes: Option<&'a str>,
    pub activity: Option<&'a Value>,
}

impl AnnotationPatch<'_> {
    pub fn is_empty(&self) -> bool {
        self.reaction.is_none()
            && self.is_favourite.is_none()
            && self.notes.is_none()
            && self.activity.is_none()
    }
}

fn stage_json(stage: &StageMap) -> Result<String, sqlx::Error> {
    serde_json::to_string(stage).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

pub async fn list_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        "SELECT * FROM tracked_jobs WHERE user_id = $1 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Advisory lock key for one user. Folds the UUID into the bigint keyspace of
/// `pg_advisory_xact_lock`.
pub fn user_lock_key(user_id: Uuid) -> i64 {
    let bits = user_id.as_u128();
    ((bits >> 64) as u64 ^ bits as u64) as i64
}

/// Same as `list_for_user`, but first takes the user's transaction-scoped
/// advisory lock and then row-locks the jobs. The advisory lock holds even
/// when the user has no rows yet, so concurrent creates and promotions for
/// one user are serialized. Both locks are released when the transaction ends.
pub async fn lock_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<TrackedJob>, sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(user_lock_key(user_id))
        .execute(&mut *conn)
        .await?;

    sqlx::query_as::<_, TrackedJob>(
        "SELECT * FROM tracked_jobs WHERE user_id = $1 ORDER BY created_at, id FOR UPDATE",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn get_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>("SELECT * FROM tracked_jobs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_posting<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        "SELECT * FROM tracked_jobs WHERE user_id = $1 AND job_id = $2",
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    params: InsertParams<'_>,
) -> Result<TrackedJob, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        r#"
        INSERT INTO tracked_jobs
            (user_id, job_id, stage, reaction, is_favourite, notes, activity)
        VALUES ($1, $2, $3::text::json, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(params.user_id)
    .bind(params.job_id)
    .bind(stage_json(params.stage)?)
    .bind(params.reaction)
    .bind(params.is_favourite)
    .bind(params.notes)
    .bind(params.activity)
    .fetch_one(executor)
    .await
}

pub async fn set_stage<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
    stage: &StageMap,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        r#"
        UPDATE tracked_jobs
        SET stage = $3::text::json, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(stage_json(stage)?)
    .fetch_optional(executor)
    .await
}

pub async fn update_annotations<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
    patch: &AnnotationPatch<'_>,
) -> Result<Option<TrackedJob>, sqlx::Error> {
    sqlx::query_as::<_, TrackedJob>(
        r#"
        UPDATE tracked_jobs
        SET reaction = COALESCE($3, reaction),
            is_favourite = COALESCE($4, is_favourite),
            notes = COALESCE($5, notes),
            activity = COALESCE($6, activity),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(patch.reaction)
    .bind(patch.is_favourite)
    .bind(patch.notes)
    .bind(patch.activity)
    .fetch_optional(executor)
    .await
}

pub async fn get_job_role<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<JobRoleRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRoleRow>("SELECT * FROM job_roles WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}
