//! Chat-completions client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint and returns
//! the raw text of the first choice. Callers decode it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use finterm_core::PipelineError;
use finterm_news::text::truncate_chars;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

const TEMPERATURE: f32 = 0.5;
/// Characters of an error body echoed back in the failure message
const ERROR_BODY_CHARS: usize = 100;

/// Connection settings for the text-generation API
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Strip one trailing slash and make sure the path carries `/v1`
pub fn normalize_base_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();
    if url.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    if url.ends_with('/') {
        url.pop();
    }
    if !url.contains("/v1") {
        url.push_str("/v1");
    }
    url
}

/// Anything that can answer a system + user prompt pair with JSON text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_json(&self, system: &str, user: &str) -> Result<String, PipelineError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ChatCompletionClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/completions", normalize_base_url(base_url)),
            api_key: api_key.into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a client from config, or `None` when no API key is set
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self::new(api_key, &config.base_url, config.model.clone()).with_timeout(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate_json(&self, system: &str, user: &str) -> Result<String, PipelineError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("User-Agent", "Mozilla/5.0")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::enrichment(format!("AI API 請求逾時 ({:?})", self.timeout))
                } else {
                    PipelineError::enrichment(format!("AI API 請求失敗: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::enrichment(format!(
                "AI API 錯誤 ({}): {}",
                status.as_u16(),
                truncate_chars(&detail, ERROR_BODY_CHARS)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::enrichment(format!("AI API 回應格式錯誤: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::enrichment("AI API 回應為空"))?;

        debug!("Received {} chars from chat completions", content.len());
        Ok(content)
    }
}
