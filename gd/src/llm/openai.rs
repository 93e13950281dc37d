//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ChatClient, LlmError};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 500;

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the chat completions endpoint
    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        debug!(%self.model, prompt_len = prompt.len(), "build_request_body: called");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        // gpt-5.x and o-series models use max_completion_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");
        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(self.max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(self.max_tokens);
        }

        body
    }

    /// Pull the reply text out of the API response
    fn parse_response(api_response: OpenAIResponse) -> Result<String, LlmError> {
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            debug!("parse_response: empty reply");
            return Err(LlmError::Unusable("empty reply".to_string()));
        }
        Ok(content)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn generate_reply(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(%self.model, "generate_reply: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(prompt);

        let mut last_error: Option<LlmError> = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = last_error
                    .as_ref()
                    .and_then(LlmError::retry_after)
                    .unwrap_or(Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1)));
                warn!(attempt, ?backoff, "generate_reply: retrying after transient error");
                tokio::time::sleep(backoff).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate_reply: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();
            if !response.status().is_success() {
                let err = if status == 429 {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(1);
                    LlmError::RateLimited {
                        retry_after: Duration::from_secs(retry_after),
                    }
                } else {
                    let message = response.text().await.unwrap_or_default();
                    LlmError::Status { status, message }
                };
                if err.is_retryable() && attempt < MAX_RETRIES {
                    debug!(attempt, status, "generate_reply: retryable status");
                    last_error = Some(err);
                    continue;
                }
                debug!(status, "generate_reply: provider error");
                return Err(err);
            }

            debug!("generate_reply: success");
            let api_response: OpenAIResponse = response
                .json()
                .await
                .map_err(|e| LlmError::Unusable(e.to_string()))?;
            return Self::parse_response(api_response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::Unavailable("retries exhausted".to_string())))
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}
