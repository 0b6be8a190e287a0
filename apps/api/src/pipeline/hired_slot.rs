//! Single-hired-slot rule: a user has at most one current job.
//!
//! A job is current when it is hired and neither archived to past roles nor
//! marked ineligible. Promoting another job to hired demotes the current one
//! to `past-roles`. The resulting updates are applied together by the caller.

use serde::Serialize;
use uuid::Uuid;

use crate::models::tracked_job::TrackedJob;
use crate::pipeline::stage_map::StageMap;

/// A stage map to persist for one tracked job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageUpdate {
    pub job_id: Uuid,
    pub stage: StageMap,
}

/// Moves `promoted` to `target` and demotes any other current job.
///
/// The promoted job's update is always first in the returned list.
pub fn on_promote_to_hired(
    all_jobs: &[TrackedJob],
    promoted: &TrackedJob,
    target: &str,
) -> Vec<StageUpdate> {
    let new_stage = promoted.stage.flatten_to(target);
    enforce_single_hired(all_jobs, promoted.id, new_stage)
}

/// Same as [`on_promote_to_hired`] for a job whose new map is already computed.
pub fn enforce_single_hired(
    all_jobs: &[TrackedJob],
    promoted_id: Uuid,
    new_stage: StageMap,
) -> Vec<StageUpdate> {
    let promotes_to_current = new_stage.is_active_hired();
    let mut updates = vec![StageUpdate {
        job_id: promoted_id,
        stage: new_stage,
    }];

    if !promotes_to_current {
        return updates;
    }

    updates.extend(
        all_jobs
            .iter()
            .filter(|job| job.id != promoted_id && job.stage.is_active_hired())
            .map(|job| StageUpdate {
                job_id: job.id,
                stage: job.stage.demote_to_past_roles(),
            }),
    );

    updates
}

/// The job currently occupying the hired slot, if any.
pub fn current_job(all_jobs: &[TrackedJob]) -> Option<&TrackedJob> {
    all_jobs.iter().find(|job| job.stage.is_active_hired())
}
