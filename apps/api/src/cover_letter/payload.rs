//! Topic weights for cover-letter generation.
//!
//! The wizard collects topics with integer weights 0–100; the generator works
//! with fractions 0.0–1.0 keyed by topic name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_TOPIC_WEIGHT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub name: String,
    pub weight: u32,
}

/// Maps each topic's 0–100 weight to `weight / 100`.
///
/// At least one topic is required. A repeated name keeps the last weight.
pub fn build_generation_payload(topics: &[Topic]) -> Result<BTreeMap<String, f64>, AppError> {
    if topics.is_empty() {
        return Err(AppError::Validation(
            "At least one topic is required".to_string(),
        ));
    }

    let mut props = BTreeMap::new();
    for topic in topics {
        let name = topic.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Topic name cannot be empty".to_string()));
        }
        if topic.weight > MAX_TOPIC_WEIGHT {
            return Err(AppError::Validation(format!(
                "Topic '{name}' weight must be between 0 and {MAX_TOPIC_WEIGHT}"
            )));
        }
        props.insert(name.to_string(), f64::from(topic.weight) / 100.0);
    }
    Ok(props)
}

/// Checks props that arrive already normalized.
pub fn validate_props(props: &BTreeMap<String, f64>) -> Result<(), AppError> {
    if props.is_empty() {
        return Err(AppError::Validation(
            "At least one topic is required".to_string(),
        ));
    }
    for (name, weight) in props {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Topic name cannot be empty".to_string()));
        }
        if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
            return Err(AppError::Validation(format!(
                "Topic '{name}' weight must be between 0.0 and 1.0"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(name: &str, weight: u32) -> Topic {
        Topic {
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn test_half_weight() {
        let props = build_generation_payload(&[topic("A", 50)]).unwrap();
        assert_eq!(props.get("A"), Some(&0.5));
    }

    #[test]
    fn test_weight_bounds() {
        let props = build_generation_payload(&[topic("zero", 0), topic("full", 100)]).unwrap();
        assert_eq!(props.get("zero"), Some(&0.0));
        assert_eq!(props.get("full"), Some(&1.0));
    }

    #[test]
    fn test_requires_a_topic() {
        assert!(matches!(
            build_generation_payload(&[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_weight_over_100() {
        assert!(build_generation_payload(&[topic("A", 101)]).is_err());
    }

    #[test]
    fn test_rejects_blank_name() {
        assert!(build_generation_payload(&[topic("  ", 10)]).is_err());
    }

    #[test]
    fn test_validate_props_range() {
        let mut props = BTreeMap::new();
        props.insert("Leadership".to_string(), 0.7);
        assert!(validate_props(&props).is_ok());

        props.insert("Rust".to_string(), 1.5);
        assert!(validate_props(&props).is_err());

        props.insert("Rust".to_string(), f64::NAN);
        assert!(validate_props(&props).is_err());

        assert!(validate_props(&BTreeMap::new()).is_err());
    }
}
