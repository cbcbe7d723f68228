//! HTTP completion client for OpenAI-compatible chat endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CompletionClient, CompletionError};

const DEFAULT_MAX_TOKENS: u32 = 4096;

// Retry configuration for rate limits and transient server errors.
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 8;

/// Client for an OpenAI-compatible `chat/completions` endpoint.
///
/// `url` is the full endpoint URL, e.g.
/// `http://localhost:11434/v1/chat/completions`. Rate limits (429) and
/// server errors (5xx) are retried with exponential backoff, honoring a
/// `retry-after` header when present.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl HttpCompletionClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            api_key,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set max tokens for responses.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut retries = 0;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            debug!(url = %self.url, attempt = retries + 1, "sending completion request");

            let mut builder = self.http.post(&self.url).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }
            let response = builder.send().await?;
            let status = response.status();

            if (status.as_u16() == 429 || status.is_server_error()) && retries < MAX_RETRIES {
                retries += 1;

                // Honor retry-after when the endpoint provides one.
                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(backoff_secs);

                warn!(
                    status = status.as_u16(),
                    wait_secs,
                    retry = retries,
                    max_retries = MAX_RETRIES,
                    "completion endpoint busy, backing off"
                );

                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                continue;
            }

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_owned());
                return Err(CompletionError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: ChatResponse = response.json().await?;
            let content = body
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.is_empty())
                .ok_or(CompletionError::Empty)?;

            debug!(chars = content.len(), "completion received");
            return Ok(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_model_and_max_tokens() {
        let client = HttpCompletionClient::new(
            "http://localhost:9999/v1/chat/completions",
            Some("secret".to_owned()),
            "test-model",
        )
        .with_max_tokens(512);

        assert_eq!(client.model, "test-model");
        assert_eq!(client.max_tokens, 512);
        assert_eq!(client.api_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        // Port 1 has no listener; the connection is refused immediately.
        let client = HttpCompletionClient::new("http://127.0.0.1:1/v1/chat/completions", None, "m");
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::Request(_)));
    }
}
