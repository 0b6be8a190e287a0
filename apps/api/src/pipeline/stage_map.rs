//! Ordered stage flag map and the pure functions over it.
//!
//! Key order is the pipeline order, so `StageMap` is a vector of pairs rather
//! than a hash map. On the wire it is a plain JSON object whose key order is
//! kept exactly as received.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::pipeline::stage::{
    default_stage_keys, StageKind, HIRED, INELIGIBLE, PAST_ROLES, SAVED,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("stage map is empty")]
    Empty,

    #[error("unrecognized stage '{0}'")]
    UnrecognizedKey(String),

    #[error("duplicate stage '{0}'")]
    DuplicateKey(String),

    #[error("stage '{0}' is not part of this job's pipeline")]
    UnknownTarget(String),

    #[error("stage '{0}' is marked complete after an incomplete stage")]
    Gap(String),

    #[error("stage '{0}' must be followed by a 'past-roles' stage")]
    MissingArchive(String),

    #[error("cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMap(Vec<(String, bool)>);

impl StageMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or overwrites a flag. Overwriting keeps the key where it first appeared.
    pub fn insert(&mut self, key: impl Into<String>, value: bool) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    fn is_set(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The standard pipeline with only `saved` set.
    pub fn default_pipeline() -> Self {
        compute_flat_stages(&default_stage_keys(), SAVED)
    }

    /// Reflattens this map so that `target` is the furthest completed stage.
    pub fn flatten_to(&self, target: &str) -> StageMap {
        let keys: Vec<&str> = self.keys().collect();
        compute_flat_stages(&keys, target)
    }

    /// `hired ∧ ¬past-roles ∧ ¬ineligible`: the job is the user's current job.
    pub fn is_active_hired(&self) -> bool {
        self.is_set(HIRED) && !self.is_set(PAST_ROLES) && !self.is_set(INELIGIBLE)
    }

    /// Key lookup that ignores case. Returns the key as stored.
    pub fn find_key(&self, key: &str) -> Option<&str> {
        self.keys().find(|k| k.eq_ignore_ascii_case(key.trim()))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Archives a hired job: every key up to and including `past-roles` is
    /// complete. Maps stored without a `past-roles` key get one appended.
    pub fn demote_to_past_roles(&self) -> StageMap {
        match self.find_key(PAST_ROLES) {
            Some(archive) => self.flatten_to(archive),
            None => {
                let mut keys: Vec<&str> = self.keys().collect();
                keys.push(PAST_ROLES);
                compute_flat_stages(&keys, PAST_ROLES)
            }
        }
    }

    /// Checks that every key is a known stage, no key repeats, the completed
    /// stages form a prefix of the key order, and a `hired` stage has a
    /// `past-roles` stage after it to be demoted into.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.is_empty() {
            return Err(StageError::Empty);
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.len());
        let mut reached_incomplete = false;
        for (key, done) in self.iter() {
            if StageKind::from_key(key).is_none() {
                return Err(StageError::UnrecognizedKey(key.to_string()));
            }
            let lower = key.to_lowercase();
            if seen.contains(&lower) {
                return Err(StageError::DuplicateKey(key.to_string()));
            }
            seen.push(lower);

            if done && reached_incomplete {
                return Err(StageError::Gap(key.to_string()));
            }
            if !done {
                reached_incomplete = true;
            }
        }

        if let Some(hired) = self.position(HIRED) {
            if !self.position(PAST_ROLES).is_some_and(|archive| archive > hired) {
                return Err(StageError::MissingArchive(self.0[hired].0.clone()));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for StageMap {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        let mut map = StageMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for StageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct StageMapVisitor;

impl<'de> Visitor<'de> for StageMapVisitor {
    type Value = StageMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping stage names to booleans")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StageMap, A::Error> {
        let mut map = StageMap(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((key, value)) = access.next_entry::<String, bool>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for StageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StageMapVisitor)
    }
}

/// Marks every key up to and including `target` complete and every later key
/// incomplete.
///
/// A `target` missing from `keys` yields an all-false map. Callers that must not
/// clear a pipeline check membership first.
pub fn compute_flat_stages<S: AsRef<str>>(keys: &[S], target: &str) -> StageMap {
    let cutoff = keys.iter().position(|k| k.as_ref() == target);
    keys.iter()
        .enumerate()
        .map(|(i, k)| (k.as_ref().to_string(), cutoff.is_some_and(|c| i <= c)))
        .collect()
}

/// The furthest completed stage, lowercased. `None` when nothing is complete.
pub fn last_completed_stage(stage: &StageMap) -> Option<String> {
    stage
        .iter()
        .filter(|(_, done)| *done)
        .last()
        .map(|(key, _)| key.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::default_stage_keys;

    fn keys() -> Vec<String> {
        default_stage_keys()
    }

    #[test]
    fn test_flat_stages_marks_exact_prefix() {
        let keys = keys();
        for (idx, target) in keys.iter().enumerate() {
            let map = compute_flat_stages(&keys, target);
            for (i, (key, done)) in map.iter().enumerate() {
                assert_eq!(done, i <= idx, "target={target} key={key}");
            }
        }
    }

    #[test]
    fn test_flat_stages_is_idempotent() {
        let keys = keys();
        let once = compute_flat_stages(&keys, "offer");
        let twice = once.flatten_to("offer");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flat_stages_keeps_key_order() {
        let keys = keys();
        let map = compute_flat_stages(&keys, "applied");
        let got: Vec<&str> = map.keys().collect();
        assert_eq!(got, keys.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_flat_stages_unknown_target_clears_everything() {
        let keys = keys();
        let map = compute_flat_stages(&keys, "ghosted");
        assert_eq!(map.len(), keys.len());
        assert!(map.iter().all(|(_, done)| !done));
    }

    #[test]
    fn test_last_completed_stage_scenario() {
        let map: StageMap = [
            ("saved", true),
            ("applied", true),
            ("interview-1", false),
            ("offer", false),
        ]
        .into_iter()
        .collect();
        assert_eq!(last_completed_stage(&map).as_deref(), Some("applied"));
    }

    #[test]
    fn test_last_completed_stage_lowercases() {
        let map: StageMap = [("Saved", true), ("Interview-2", true)].into_iter().collect();
        assert_eq!(last_completed_stage(&map).as_deref(), Some("interview-2"));
    }

    #[test]
    fn test_last_completed_stage_empty_is_none() {
        assert_eq!(last_completed_stage(&StageMap::new()), None);
        let none_done: StageMap = [("saved", false)].into_iter().collect();
        assert_eq!(last_completed_stage(&none_done), None);
    }

    #[test]
    fn test_active_hired_requires_not_archived() {
        let keys = keys();
        assert!(compute_flat_stages(&keys, "hired").is_active_hired());
        assert!(!compute_flat_stages(&keys, "past-roles").is_active_hired());
        assert!(!compute_flat_stages(&keys, "ineligible").is_active_hired());
        assert!(!compute_flat_stages(&keys, "offer").is_active_hired());
    }

    #[test]
    fn test_default_pipeline_is_saved_only() {
        let map = StageMap::default_pipeline();
        assert_eq!(last_completed_stage(&map).as_deref(), Some("saved"));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_gap() {
        let map: StageMap = [("saved", false), ("applied", true)].into_iter().collect();
        assert_eq!(map.validate(), Err(StageError::Gap("applied".to_string())));
    }

    #[test]
    fn test_validate_rejects_unknown_and_duplicate_keys() {
        let unknown: StageMap = [("saved", true), ("ghosted", false)].into_iter().collect();
        assert_eq!(
            unknown.validate(),
            Err(StageError::UnrecognizedKey("ghosted".to_string()))
        );

        let dup: StageMap = [("saved", true), ("Saved", false)].into_iter().collect();
        assert_eq!(dup.validate(), Err(StageError::DuplicateKey("Saved".to_string())));

        assert_eq!(StageMap::new().validate(), Err(StageError::Empty));
    }

    #[test]
    fn test_validate_requires_past_roles_after_hired() {
        let no_archive: StageMap = [
            ("saved", true),
            ("applied", true),
            ("offer", true),
            ("hired", true),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            no_archive.validate(),
            Err(StageError::MissingArchive("hired".to_string()))
        );

        let archive_first: StageMap = [("saved", true), ("past-roles", false), ("Hired", false)]
            .into_iter()
            .collect();
        assert_eq!(
            archive_first.validate(),
            Err(StageError::MissingArchive("Hired".to_string()))
        );

        let no_hired: StageMap = [("saved", true), ("applied", false)].into_iter().collect();
        assert!(no_hired.validate().is_ok());
    }

    #[test]
    fn test_demote_keeps_history_and_sets_past_roles() {
        let map = StageMap::default_pipeline().flatten_to("hired");
        let demoted = map.demote_to_past_roles();
        assert_eq!(demoted.keys().collect::<Vec<_>>(), map.keys().collect::<Vec<_>>());
        assert_eq!(demoted.get("offer"), Some(true));
        assert_eq!(demoted.get("past-roles"), Some(true));
        assert_eq!(demoted.get("ineligible"), Some(false));
    }

    #[test]
    fn test_demote_appends_missing_past_roles() {
        let legacy: StageMap = [
            ("saved", true),
            ("applied", true),
            ("offer", true),
            ("hired", true),
        ]
        .into_iter()
        .collect();
        let demoted = legacy.demote_to_past_roles();
        assert_eq!(
            demoted.keys().collect::<Vec<_>>(),
            vec!["saved", "applied", "offer", "hired", "past-roles"]
        );
        assert!(demoted.iter().all(|(_, done)| done));
        assert!(!demoted.is_active_hired());
    }

    #[test]
    fn test_json_preserves_key_order() {
        let json = r#"{"saved":true,"applied":true,"interview-1":false,"offer":false,"hired":false}"#;
        let map: StageMap = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["saved", "applied", "interview-1", "offer", "hired"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn test_json_rejects_non_boolean_flags() {
        let result: Result<StageMap, _> = serde_json::from_str(r#"{"saved":"yes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_find_key_ignores_case() {
        let map = StageMap::default_pipeline();
        assert_eq!(map.find_key("Past-Roles"), Some("past-roles"));
        assert_eq!(map.find_key("ghosted"), None);
    }
}
