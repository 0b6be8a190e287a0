//! Stage kinds and the transition table between them.
//!
//! A tracked job's stage map may carry several interview rounds (`interview-1`,
//! `interview-2`, ...). They all share one [`StageKind::Interview`] so that the
//! transition table and the board columns stay independent of the round count.

use serde::{Deserialize, Serialize};

pub const SAVED: &str = "saved";
pub const APPLIED: &str = "applied";
pub const INTERVIEW: &str = "interview";
pub const OFFER: &str = "offer";
pub const HIRED: &str = "hired";
pub const PAST_ROLES: &str = "past-roles";
pub const INELIGIBLE: &str = "ineligible";

const INTERVIEW_PREFIX: &str = "interview-";

/// Number of interview rounds in the default pipeline.
pub const DEFAULT_INTERVIEW_ROUNDS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    Saved,
    Applied,
    Interview,
    Offer,
    Hired,
    PastRoles,
    Ineligible,
}

impl StageKind {
    /// Board column order.
    pub const ALL: [StageKind; 7] = [
        StageKind::Saved,
        StageKind::Applied,
        StageKind::Interview,
        StageKind::Offer,
        StageKind::Hired,
        StageKind::PastRoles,
        StageKind::Ineligible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Saved => SAVED,
            StageKind::Applied => APPLIED,
            StageKind::Interview => INTERVIEW,
            StageKind::Offer => OFFER,
            StageKind::Hired => HIRED,
            StageKind::PastRoles => PAST_ROLES,
            StageKind::Ineligible => INELIGIBLE,
        }
    }

    /// Resolves a stage-map key to its kind. Matching is case-insensitive.
    /// Any `interview-<round>` key resolves to `Interview`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        match key.as_str() {
            SAVED => Some(StageKind::Saved),
            APPLIED => Some(StageKind::Applied),
            INTERVIEW => Some(StageKind::Interview),
            OFFER => Some(StageKind::Offer),
            HIRED => Some(StageKind::Hired),
            PAST_ROLES => Some(StageKind::PastRoles),
            INELIGIBLE => Some(StageKind::Ineligible),
            other if other.starts_with(INTERVIEW_PREFIX) => Some(StageKind::Interview),
            _ => None,
        }
    }

    /// Stages a job may move to from `current`. `None` means the job has no
    /// completed stage yet.
    pub fn allowed_targets(current: Option<StageKind>) -> &'static [StageKind] {
        use StageKind::*;
        match current {
            None => &[Saved, Applied],
            Some(Saved) => &[Applied, Ineligible],
            Some(Applied) => &[Saved, Interview, Offer, Ineligible],
            Some(Interview) => &[Applied, Interview, Offer, Ineligible],
            Some(Offer) => &[Interview, Applied, Hired, Ineligible],
            Some(Hired) => &[Offer, PastRoles],
            Some(PastRoles) => &[Hired],
            Some(Ineligible) => &[Saved, Applied, Interview, Offer],
        }
    }

    /// Staying on the current kind is always allowed.
    pub fn can_transition(current: Option<StageKind>, target: StageKind) -> bool {
        current == Some(target) || Self::allowed_targets(current).contains(&target)
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercases a stage key and collapses every `interview-*` key to `interview`.
pub fn canonical_stage_label(key: &str) -> String {
    let lower = key.to_lowercase();
    if lower.starts_with(INTERVIEW_PREFIX) {
        INTERVIEW.to_string()
    } else {
        lower
    }
}

/// Key order of a freshly tracked job.
pub fn default_stage_keys() -> Vec<String> {
    let mut keys = vec![SAVED.to_string(), APPLIED.to_string()];
    keys.extend((1..=DEFAULT_INTERVIEW_ROUNDS).map(|round| format!("{INTERVIEW_PREFIX}{round}")));
    keys.extend([OFFER, HIRED, PAST_ROLES, INELIGIBLE].map(String::from));
    keys
}
