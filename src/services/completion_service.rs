/// Completion service client: sends the schema prompt and the user's question
/// to the Anthropic Messages API and returns the generated text

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    config::CompletionConfig,
    middleware::{
        error_handling::{AppError, Result},
        metrics::record_completion_tokens,
    },
};

pub const DEFAULT_COMPLETION_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_COMPLETION_MODEL: &str = "claude-3-5-sonnet-20241022";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ============================================================================
// Request/Response Models
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String, // "user" or "assistant"
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

// ============================================================================
// Public API Models
// ============================================================================

/// One chat-style completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: u64,
}

pub fn user_message(content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role: "user".to_string(),
        content: content.into(),
    }
}

/// Text-in/text-out completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

// ============================================================================
// Anthropic Messages API Client
// ============================================================================

pub struct ClaudeCompletionService {
    api_key: String,
    api_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl ClaudeCompletionService {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for ClaudeCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let start_time = Instant::now();

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: &request.messages,
            system: request.system_prompt.as_deref(),
            temperature: request.temperature,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::Completion(format!(
                "API returned {}: {}",
                status, error_body
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("failed to parse response: {}", e)))?;

        let latency_ms = start_time.elapsed().as_millis() as u64;

        let content = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        record_completion_tokens(parsed.usage.input_tokens, parsed.usage.output_tokens);

        tracing::info!(
            model = %self.model,
            tokens_in = parsed.usage.input_tokens,
            tokens_out = parsed.usage.output_tokens,
            latency_ms,
            "Completion API call"
        );

        Ok(CompletionResponse {
            content,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            latency_ms,
        })
    }
}
