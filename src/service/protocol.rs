//! Wire types for the description service (`/ask`, `/analyze-image`).

use serde::{Deserialize, Serialize};

/// One provider/model pair of the array-based model selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub provider: String,
    pub model: String,
}

/// Model selection sent with every request: a single model name, or an ordered list of
/// provider/model pairs the service may fall through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSpec {
    Single(String),
    Providers(Vec<ProviderModel>),
}

impl ModelSpec {
    /// Returns a description of the first problem, if any.
    pub fn validate(&self) -> Option<String> {
        match self {
            ModelSpec::Single(name) if name.trim().is_empty() => {
                Some("model name is empty".to_string())
            }
            ModelSpec::Single(_) => None,
            ModelSpec::Providers(list) if list.is_empty() => {
                Some("provider list is empty".to_string())
            }
            ModelSpec::Providers(list) => list.iter().enumerate().find_map(|(i, pm)| {
                (pm.provider.trim().is_empty() || pm.model.trim().is_empty())
                    .then(|| format!("[{i}]: both provider and model must be non-empty"))
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub history: Vec<ChatMessage<'a>>,
    pub model: &'a ModelSpec,
}

impl<'a> ChatRequest<'a> {
    /// Single-turn request carrying `prompt` as the user message.
    pub fn user(prompt: &'a str, model: &'a ModelSpec) -> Self {
        Self {
            history: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub queue_length: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageRequest<'a> {
    /// Base64-encoded image bytes.
    pub image: &'a str,
    pub model: &'a ModelSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub analysis: String,
    #[serde(default)]
    pub queue_length: i64,
}
