//! Tracked-job mutations.
//!
//! Every mutation runs inside one transaction that takes the user's lock,
//! computes the new maps with the pipeline module, writes all of them, and
//! commits. The cached job list is invalidated after commit. A unique
//! violation that slips past the duplicate check surfaces as a 409.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::cache::JobCache;
use crate::errors::AppError;
use crate::models::tracked_job::TrackedJob;
use crate::pipeline::hired_slot::{enforce_single_hired, on_promote_to_hired, StageUpdate};
use crate::pipeline::{last_completed_stage, StageError, StageKind, StageMap};
use crate::tracking::repo::{self, AnnotationPatch, InsertParams};

#[derive(Debug, Deserialize)]
pub struct CreateTrackedJobRequest {
    pub job_id: Uuid,
    /// Defaults to the standard pipeline with `saved` complete.
    pub stage: Option<StageMap>,
    pub notes: Option<String>,
    pub activity: Option<Value>,
    pub reaction: Option<String>,
    #[serde(default)]
    pub is_favourite: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrackedJobRequest {
    pub stage: Option<StageMap>,
    pub notes: Option<String>,
    pub activity: Option<Value>,
    pub reaction: Option<String>,
    pub is_favourite: Option<bool>,
}

impl UpdateTrackedJobRequest {
    fn annotations(&self) -> AnnotationPatch<'_> {
        AnnotationPatch {
            reaction: self.reaction.as_deref(),
            is_favourite: self.is_favourite,
            notes: self.notes.as_deref(),
            activity: self.activity.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveStageRequest {
    pub stage: String,
}

#[derive(Debug, Serialize)]
pub struct MoveStageResponse {
    /// Every job whose stage changed. The moved job comes first.
    pub updated: Vec<TrackedJob>,
}

/// Returns the user's tracked jobs, from cache when possible.
pub async fn list_tracked_jobs(
    pool: &PgPool,
    cache: &JobCache,
    user_id: Uuid,
) -> Result<Vec<TrackedJob>, AppError> {
    if let Some(jobs) = cache.get_jobs(user_id).await {
        return Ok(jobs);
    }
    let jobs = repo::list_for_user(pool, user_id).await?;
    cache.put_jobs(user_id, &jobs).await;
    Ok(jobs)
}

pub async fn get_tracked_job(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<TrackedJob, AppError> {
    repo::get_for_user(pool, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tracked job {id} not found")))
}

pub async fn create_tracked_job(
    pool: &PgPool,
    cache: &JobCache,
    user_id: Uuid,
    request: CreateTrackedJobRequest,
) -> Result<TrackedJob, AppError> {
    let stage = request.stage.unwrap_or_else(StageMap::default_pipeline);
    stage.validate()?;
    let activity = request.activity.unwrap_or_else(|| Value::Array(Vec::new()));

    let mut tx = pool.begin().await?;
    let others = repo::lock_for_user(&mut tx, user_id).await?;

    if repo::get_job_role(&mut *tx, request.job_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Job role {} not found",
            request.job_id
        )));
    }
    if repo::find_by_posting(&mut *tx, user_id, request.job_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Job {} is already tracked",
            request.job_id
        )));
    }

    let created = repo::insert(
        &mut *tx,
        InsertParams {
            user_id,
            job_id: request.job_id,
            stage: &stage,
            reaction: request.reaction.as_deref(),
            is_favourite: request.is_favourite,
            notes: request.notes.as_deref(),
            activity: &activity,
        },
    )
    .await?;

    // The new row already carries its stage; only demotions remain.
    let demotions = enforce_single_hired(&others, created.id, stage);
    apply_stage_updates(&mut tx, user_id, &demotions[1..]).await?;

    tx.commit().await?;
    cache.invalidate(user_id).await;

    info!(
        "User {user_id} started tracking job {} as {}",
        created.job_id, created.id
    );
    Ok(created)
}

pub async fn update_tracked_job(
    pool: &PgPool,
    cache: &JobCache,
    user_id: Uuid,
    id: Uuid,
    request: UpdateTrackedJobRequest,
) -> Result<TrackedJob, AppError> {
    let mut tx = pool.begin().await?;
    let jobs = repo::lock_for_user(&mut tx, user_id).await?;
    let existing = jobs
        .iter()
        .find(|job| job.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Tracked job {id} not found")))?;

    let mut updated = existing;
    if let Some(stage) = request.stage.clone() {
        stage.validate()?;
        let updates = enforce_single_hired(&jobs, id, stage);
        log_demotions(user_id, &updates);
        let mut written = apply_stage_updates(&mut tx, user_id, &updates).await?;
        updated = written.remove(0);
    }

    let annotations = request.annotations();
    if !annotations.is_empty() {
        updated = repo::update_annotations(&mut *tx, user_id, id, &annotations)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tracked job {id} not found")))?;
    }

    tx.commit().await?;
    cache.invalidate(user_id).await;
    Ok(updated)
}

/// Moves a job to `target` after checking the transition table, demoting the
/// current job if the move fills the hired slot.
pub async fn move_stage(
    pool: &PgPool,
    cache: &JobCache,
    user_id: Uuid,
    id: Uuid,
    target: &str,
) -> Result<MoveStageResponse, AppError> {
    let mut tx = pool.begin().await?;
    let jobs = repo::lock_for_user(&mut tx, user_id).await?;
    let job = jobs
        .iter()
        .find(|job| job.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Tracked job {id} not found")))?;

    let target_key = resolve_move(&job.stage, target)?;
    let updates = on_promote_to_hired(&jobs, job, &target_key);
    log_demotions(user_id, &updates);

    let updated = apply_stage_updates(&mut tx, user_id, &updates).await?;
    tx.commit().await?;
    cache.invalidate(user_id).await;

    info!("User {user_id} moved tracked job {id} to {target_key}");
    Ok(MoveStageResponse { updated })
}

/// Checks a requested move against the job's own keys and the transition
/// table. Returns the target key exactly as stored in the map.
pub fn resolve_move(stage: &StageMap, target: &str) -> Result<String, StageError> {
    let target_key = stage
        .find_key(target)
        .ok_or_else(|| StageError::UnknownTarget(target.to_string()))?
        .to_string();
    let target_kind = StageKind::from_key(&target_key)
        .ok_or_else(|| StageError::UnrecognizedKey(target_key.clone()))?;

    let current = last_completed_stage(stage);
    let current_kind = current.as_deref().and_then(StageKind::from_key);
    if !StageKind::can_transition(current_kind, target_kind) {
        return Err(StageError::InvalidTransition {
            from: current.unwrap_or_else(|| "none".to_string()),
            to: target_key,
        });
    }
    Ok(target_key)
}

fn log_demotions(user_id: Uuid, updates: &[StageUpdate]) {
    for demoted in updates.iter().skip(1) {
        info!(
            "User {user_id}: tracked job {} moved to past roles, hired slot taken by {}",
            demoted.job_id, updates[0].job_id
        );
    }
}

async fn apply_stage_updates(
    conn: &mut PgConnection,
    user_id: Uuid,
    updates: &[StageUpdate],
) -> Result<Vec<TrackedJob>, AppError> {
    let mut written = Vec::with_capacity(updates.len());
    for update in updates {
        let row = repo::set_stage(&mut *conn, user_id, update.job_id, &update.stage)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tracked job {} not found", update.job_id)))?;
        written.push(row);
    }
    Ok(written)
}
