//! Anthropic Messages API client.
//!
//! ### Specification
//!
//! - **Endpoint**: `{base_url}/messages`
//! - **Authentication**: `x-api-key` header plus `anthropic-version`.
//! - **Request**: one user message and a `max_tokens` budget.
//! - **Response**: the concatenated `text` content blocks; no text blocks
//!   means no payload.
//! - **Failures**: 401/403 auth, 429 rate limit, other non-2xx with status.
//!   Nothing is retried here.

use std::time::{Duration, Instant};

use parodist_core::AppConfig;
use reqwest::header;
use serde::{Deserialize, Serialize};

use super::{Completion, CompletionRequest, ModelClient, ModelError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_USER_AGENT: &str = concat!("parodist/", env!("CARGO_PKG_VERSION"));

/// Anthropic client configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Checked when a completion is requested, not at construction.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model used when a request carries no override.
    pub model: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "claude-sonnet-4-5".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AnthropicConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.require_anthropic_api_key().ok().map(str::to_string),
            base_url: config.anthropic_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.model_timeout(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl MessagesResponse {
    fn text_payload(self) -> Option<String> {
        let texts: Vec<String> = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if texts.is_empty() { None } else { Some(texts.concat()) }
    }
}

/// Anthropic Messages API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ModelError> {
        let api_key = self.config.api_key.as_deref().ok_or(ModelError::MissingApiKey)?;
        let model = request.model.as_deref().unwrap_or(&self.config.model);

        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens,
            messages: [Message { role: "user", content: &request.prompt }],
        };

        let start = Instant::now();
        tracing::debug!(model, prompt_chars = request.prompt.len(), max_tokens = request.max_tokens, "calling model");

        let response = self
            .http
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("model response status: {}", status);

        if status == 401 || status == 403 {
            return Err(ModelError::AuthError);
        }

        if status == 429 {
            return Err(ModelError::RateLimited);
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).chars().take(200).collect());
            return Err(ModelError::HttpError { status: status.as_u16(), message });
        }

        let parsed: MessagesResponse =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse(e.to_string()))?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(max_tokens = request.max_tokens, "model output hit the token budget and may be cut off");
        }

        let text = parsed.text_payload();
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            text_chars = text.as_ref().map(String::len).unwrap_or(0),
            "model call completed"
        );

        Ok(Completion { text })
    }
}
