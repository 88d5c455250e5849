use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::summary::FileSummary;
use crate::config::MapConfig;
use crate::error::{MapperError, Result};

/// Produces the raw completion text for one file
pub trait Describer: Send + Sync {
    fn describe(
        &self,
        summary: &FileSummary,
        model: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl From<&MapConfig> for ChatClientConfig {
    fn from(config: &MapConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Describer backed by an OpenAI-compatible chat-completions endpoint
pub struct ChatDescriber {
    config: ChatClientConfig,
    http: reqwest::Client,
}

impl ChatDescriber {
    pub fn new(config: ChatClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MapperError::Enrichment(format!("failed to build http client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = chat_completions_url(&self.config.endpoint);
        let payload = ChatCompletionsRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: Some(0.0),
        };

        let mut request = self.http.post(&url).json(&payload);
        if let Some(api_key) = self.config.api_key.as_ref() {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MapperError::Enrichment(format!(
                    "request timed out after {:?} (model={})",
                    self.config.timeout, model
                ))
            } else {
                MapperError::Enrichment(format!("request failed (model={}): {}", model, e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MapperError::Enrichment(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(MapperError::Enrichment(format!(
                "endpoint returned HTTP {}: {}",
                status,
                truncate_for_error(&body)
            )));
        }

        completion_text(&body)
    }
}

impl Describer for ChatDescriber {
    async fn describe(&self, summary: &FileSummary, model: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(FileSummary::system_prompt()),
            ChatMessage::user(summary.user_prompt()),
        ];
        self.complete(model, &messages).await
    }
}

fn chat_completions_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint)
    }
}

/// First choice's message text; a body without one is malformed
fn completion_text(body: &str) -> Result<String> {
    let parsed: ChatCompletionsResponse = serde_json::from_str(body).map_err(|e| {
        MapperError::Enrichment(format!(
            "invalid JSON from endpoint: {} (body={})",
            e,
            truncate_for_error(body)
        ))
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| MapperError::Enrichment("response had no choices".to_string()))?
        .message
        .content
        .into_text()
        .ok_or_else(|| MapperError::Enrichment("response had empty message content".to_string()))
}

fn truncate_for_error(value: &str) -> String {
    const LIMIT: usize = 400;
    if value.len() <= LIMIT {
        value.to_string()
    } else {
        let mut end = LIMIT;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &value[..end])
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: ChatContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

impl ChatContent {
    fn into_text(self) -> Option<String> {
        let text = match self {
            ChatContent::Text(text) => text.trim().to_string(),
            ChatContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|p| p.text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatContentPart {
    #[serde(default)]
    text: Option<String>,
}
