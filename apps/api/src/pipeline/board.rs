//! Kanban projection of a user's tracked jobs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::tracked_job::TrackedJob;
use crate::pipeline::hired_slot::current_job;
use crate::pipeline::stage::{canonical_stage_label, StageKind};
use crate::pipeline::stage_map::last_completed_stage;

#[derive(Debug, Clone, Serialize)]
pub struct BoardCard {
    pub id: Uuid,
    pub job_id: Uuid,
    /// Raw key of the furthest completed stage, e.g. `interview-2`.
    pub last_stage: String,
    /// Display label, `interview` for every round.
    pub label: String,
    pub is_favourite: bool,
    pub reaction: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage: StageKind,
    pub jobs: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
    pub current_job: Option<BoardCard>,
    /// Jobs with no completed stage. They have no column.
    pub unstaged: usize,
}

fn card(job: &TrackedJob, last_stage: String) -> BoardCard {
    BoardCard {
        id: job.id,
        job_id: job.job_id,
        label: canonical_stage_label(&last_stage),
        last_stage,
        is_favourite: job.is_favourite,
        reaction: job.reaction.clone(),
        updated_at: job.updated_at,
    }
}

/// Groups jobs into one column per stage kind, most recently updated first.
pub fn build_board(jobs: &[TrackedJob]) -> Board {
    let mut columns: Vec<BoardColumn> = StageKind::ALL
        .iter()
        .map(|&stage| BoardColumn {
            stage,
            jobs: Vec::new(),
        })
        .collect();
    let mut unstaged = 0;

    for job in jobs {
        let Some(last) = last_completed_stage(&job.stage) else {
            unstaged += 1;
            continue;
        };
        let Some(kind) = StageKind::from_key(&last) else {
            unstaged += 1;
            continue;
        };
        if let Some(column) = columns.iter_mut().find(|c| c.stage == kind) {
            column.jobs.push(card(job, last));
        }
    }

    for column in &mut columns {
        column.jobs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }

    let current_job = current_job(jobs).map(|job| {
        let last = last_completed_stage(&job.stage).unwrap_or_default();
        card(job, last)
    });

    Board {
        columns,
        current_job,
        unstaged,
    }
}
