//! Cover-letter generation.
//!
//! Flow: resolve topic weights → load job role → fill prompt → model call →
//! return the text. The response is not interpreted beyond trimming.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cover_letter::payload::{build_generation_payload, validate_props, Topic};
use crate::cover_letter::prompts::{COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::job_role::JobRoleRow;

/// Request body for POST /generate.
///
/// Callers send either normalized `props` or raw wizard `topics`; `topics` wins
/// when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub job_role_id: Uuid,
    #[serde(default)]
    pub props: BTreeMap<String, f64>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl GenerateRequest {
    pub fn resolve_props(&self) -> Result<BTreeMap<String, f64>, AppError> {
        if !self.topics.is_empty() {
            return build_generation_payload(&self.topics);
        }
        validate_props(&self.props)?;
        Ok(self.props.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverLetter {
    pub paragraphs: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub cover_letter: CoverLetter,
}

/// Renders topics heaviest first; ties keep name order.
fn render_topics(props: &BTreeMap<String, f64>) -> String {
    let mut topics: Vec<(&String, &f64)> = props.iter().collect();
    topics.sort_by(|a, b| b.1.total_cmp(a.1));
    topics
        .iter()
        .map(|(name, weight)| format!("- {name} (weight {weight:.2})"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(role: &JobRoleRow, props: &BTreeMap<String, f64>) -> String {
    let description = if role.description.trim().is_empty() {
        "(no description provided)"
    } else {
        role.description.trim()
    };

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{title}", role.title.trim())
        .replace("{company}", role.company_name.trim())
        .replace("{description}", description)
        .replace("{topics}", &render_topics(props))
}

pub async fn generate_cover_letter(
    writer: &dyn TextGenerator,
    role: &JobRoleRow,
    props: &BTreeMap<String, f64>,
) -> Result<CoverLetter, AppError> {
    let prompt = build_prompt(role, props);
    info!(
        "Generating cover letter for job role {} with {} topics",
        role.id,
        props.len()
    );

    let text = writer.generate_text(&prompt, COVER_LETTER_SYSTEM).await?;

    Ok(CoverLetter {
        paragraphs: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct CannedWriter {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedWriter {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedWriter {
        async fn generate_text(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    fn role() -> JobRoleRow {
        JobRoleRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company_name: "Candid".to_string(),
            description: "Build APIs in Rust.".to_string(),
            created_at: Utc::now(),
        }
    }

    fn props(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_topics_rendered_heaviest_first() {
        let rendered = render_topics(&props(&[("Teamwork", 0.2), ("Rust", 0.9)]));
        assert_eq!(rendered, "- Rust (weight 0.90)\n- Teamwork (weight 0.20)");
    }

    #[test]
    fn test_prompt_includes_role_details() {
        let prompt = build_prompt(&role(), &props(&[("Rust", 1.0)]));
        assert!(prompt.contains("Role: Backend Engineer"));
        assert!(prompt.contains("Company: Candid"));
        assert!(prompt.contains("Build APIs in Rust."));
        assert!(prompt.contains("- Rust (weight 1.00)"));
        assert!(!prompt.contains("{topics}"));
    }

    #[test]
    fn test_request_prefers_topics() {
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "job_role_id": Uuid::new_v4(),
            "props": {"Ignored": 0.1},
            "topics": [{"name": "A", "weight": 50}]
        }))
        .unwrap();
        assert_eq!(request.resolve_props().unwrap(), props(&[("A", 0.5)]));
    }

    #[test]
    fn test_request_with_props_only() {
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "job_role_id": Uuid::new_v4(),
            "props": {"Leadership": 0.75}
        }))
        .unwrap();
        assert_eq!(request.resolve_props().unwrap(), props(&[("Leadership", 0.75)]));
    }

    #[test]
    fn test_request_without_topics_is_rejected() {
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "job_role_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(matches!(request.resolve_props(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_generate_trims_model_output() {
        let writer = CannedWriter::replying("\n  Dear Candid team,\n\nI build APIs.  \n");
        let letter = generate_cover_letter(&writer, &role(), &props(&[("Rust", 1.0)]))
            .await
            .unwrap();
        assert_eq!(letter.paragraphs, "Dear Candid team,\n\nI build APIs.");
        assert_eq!(writer.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_surfaces_model_failure() {
        let writer = CannedWriter {
            reply: Err(()),
            prompts: Mutex::new(Vec::new()),
        };
        let result = generate_cover_letter(&writer, &role(), &props(&[("Rust", 1.0)])).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[test]
    fn test_response_shape() {
        let response = GenerateResponse {
            cover_letter: CoverLetter {
                paragraphs: "Hello".to_string(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["cover_letter"]["paragraphs"], "Hello");
    }
}
