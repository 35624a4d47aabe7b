//! Completion API seam: wire types, the async client trait, the reqwest
//! implementation, and response classification.
//!
//! The trait is the only transport boundary in the crate. Implementations
//! return the raw status and JSON body; [`classify`] turns that pair into a
//! tagged [`Completion`] so the pipeline never probes optional JSON fields
//! itself. The trait is mockable for tests via `mockall`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::PipelineConfig;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for the chat completions endpoint. Constructed fresh per
/// attempt; always a single user message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn single_user(model: &str, content: String) -> Self {
        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

/// Raw response from the completion service: HTTP status plus decoded JSON
/// body. A body that is not JSON decodes to `Value::Null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Classified outcome of one completion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Success { summary: String, total_tokens: u64 },
    RetryableOversize,
    TerminalFailure { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

const GENERIC_ERROR: &str = "An error occurred.";

/// Classifies a raw response: 200 is a success (a 200 missing the summary
/// content counts as a terminal failure, not a crash), 400 signals an
/// oversized request, anything else is terminal with the provider's error
/// message when present.
pub fn classify(response: &ApiResponse) -> Completion {
    match response.status {
        200 => match serde_json::from_value::<SuccessBody>(response.body.clone()) {
            Ok(body) => {
                let total_tokens = body.usage.map(|u| u.total_tokens).unwrap_or(0);
                match body.choices.into_iter().next().and_then(|c| c.message.content) {
                    Some(content) => Completion::Success {
                        summary: content.trim().to_string(),
                        total_tokens,
                    },
                    None => Completion::TerminalFailure {
                        status: 200,
                        message: "Response is missing the summary content".to_string(),
                    },
                }
            }
            Err(e) => Completion::TerminalFailure {
                status: 200,
                message: format!("Malformed success body: {e}"),
            },
        },
        400 => Completion::RetryableOversize,
        status => {
            let message = serde_json::from_value::<ErrorBody>(response.body.clone())
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| GENERIC_ERROR.to_string());
            Completion::TerminalFailure { status, message }
        }
    }
}

/// Transport abstraction over the completion service. Implementations submit
/// one request and hand back the raw status/body pair; transport-level
/// failures (DNS, timeout) surface as `Err`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> Result<ApiResponse, Box<dyn std::error::Error + Send + Sync>>;
}

/// Production client for the OpenAI-compatible chat completions endpoint.
/// Bearer authentication; request and connect timeouts come from config
/// rather than the HTTP client's defaults.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(OpenAiClient {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> Result<ApiResponse, Box<dyn std::error::Error + Send + Sync>> {
        let start = std::time::Instant::now();
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        debug!(
            status,
            duration_secs = start.elapsed().as_secs_f32(),
            "Completion API call finished"
        );
        Ok(ApiResponse { status, body })
    }
}
