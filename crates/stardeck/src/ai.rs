//! AI-assisted annotation.
//!
//! Sends a repository's metadata to an OpenAI-compatible chat endpoint and
//! extracts a category, up to three tags, and a refined description. The
//! endpoint, model, and key come from user settings; the call is a single
//! attempt with no retry budget.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::http::{HttpError, HttpRequest, HttpTransport};
use crate::model::{Category, OpenAiSettings, Repo};

/// Maximum number of tags kept from a model response.
pub const MAX_TAGS: usize = 3;

/// Structured result of an analysis call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AiAnalysis {
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI settings are not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Transport(#[from] HttpError),

    #[error("AI endpoint returned status {code}")]
    Status { code: u16 },

    #[error("failed to decode AI response: {0}")]
    Decode(String),

    #[error("AI response carried no usable category or tags")]
    Incomplete,
}

/// Client for the annotation model endpoint.
pub struct AiClient {
    transport: Arc<dyn HttpTransport>,
}

impl AiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Analyze one repository and return the structured annotation.
    pub async fn analyze(
        &self,
        settings: &OpenAiSettings,
        repo: &Repo,
    ) -> Result<AiAnalysis, AiError> {
        if !settings.is_configured() {
            return Err(AiError::NotConfigured);
        }

        let body = serde_json::json!({
            "model": settings.model,
            "messages": [{ "role": "user", "content": build_prompt(repo) }],
        });
        let payload = serde_json::to_vec(&body).map_err(|e| AiError::Decode(e.to_string()))?;

        let request = HttpRequest::post(
            settings.endpoint.clone(),
            vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", settings.key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            payload,
        );

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(AiError::Status {
                code: response.status,
            });
        }

        let chat: ChatResponse = serde_json::from_slice(&response.body)
            .map_err(|e| AiError::Decode(e.to_string()))?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AiError::Decode("response carried no choices".to_string()))?;

        extract_analysis(content)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Build the analysis prompt from a repository's metadata.
fn build_prompt(repo: &Repo) -> String {
    let describe = |s: &str| {
        if s.is_empty() {
            "none".to_string()
        } else {
            s.to_string()
        }
    };
    let join = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    format!(
        "You are a software project analyst. Analyze this repository:\n\
         - name: {name}\n\
         - description: {description}\n\
         - primary language: {language}\n\
         - languages: {languages}\n\
         - topics: {topics}\n\n\
         Pick exactly one category from: {categories}.\n\
         Provide up to {max_tags} short tags and a one-sentence description\n\
         more precise than the original.\n\n\
         Answer with strict JSON only, in this shape:\n\
         {{\"category\": \"...\", \"tags\": [\"...\"], \"description\": \"...\"}}",
        name = repo.name,
        description = describe(&repo.description),
        language = describe(&repo.language),
        languages = join(&repo.languages),
        topics = join(&repo.topics),
        categories = categories.join(", "),
        max_tags = MAX_TAGS,
    )
}

#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
}

/// Parse the model's content into an [`AiAnalysis`].
///
/// Accepts either a bare JSON object or one embedded in surrounding prose;
/// tags may arrive as an array or a comma-separated string.
fn extract_analysis(content: &str) -> Result<AiAnalysis, AiError> {
    let raw: RawAnalysis = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(_) => {
            let start = content.find('{');
            let end = content.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if end > start => {
                    serde_json::from_str(&content[start..=end])
                        .map_err(|e| AiError::Decode(e.to_string()))?
                }
                _ => {
                    return Err(AiError::Decode(
                        "response carried no JSON object".to_string(),
                    ));
                }
            }
        }
    };

    let category = raw
        .category
        .as_deref()
        .and_then(|s| s.parse::<Category>().ok());

    let mut tags: Vec<String> = match raw.tags {
        serde_json::Value::String(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    tags.retain(|t| !t.is_empty());
    tags.truncate(MAX_TAGS);

    if category.is_none() && tags.is_empty() {
        return Err(AiError::Incomplete);
    }

    Ok(AiAnalysis {
        category,
        tags,
        description: raw.description.unwrap_or_default(),
    })
}
