//! Completion service client
//!
//! Trait seam for the conversational completion service plus the Ollama
//! implementation. The client never shapes prompts or post-processes
//! replies; it moves strings over HTTP and reports unavailability.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::StoreError;

/// Default local Ollama endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Default completion model
pub const DEFAULT_MODEL: &str = "llama3:latest";

/// Completion calls can take a while on modest hardware
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
/// The availability probe must return fast enough for a 30-second poll
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Assistant error types
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The completion service did not respond, returned a non-success
    /// status, or produced an empty payload
    #[error("assistant service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Reading the record store failed while assembling context
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for assistant operations
pub type AssistantResult<T> = Result<T, AssistantError>;

/// Sampling options forwarded with every completion call
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub repeat_penalty: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            repeat_penalty: 1.1,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: &'a CompletionOptions,
}

/// Reply body: newer servers put the text under `message.content`, older
/// ones under `response`
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
    response: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Seam for the external completion service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Cheap liveness probe; never fails, just answers up or down
    async fn is_available(&self) -> bool;

    /// Send a rendered prompt and return the raw reply text
    async fn complete(&self, prompt: &str) -> AssistantResult<String>;
}

/// Client for a locally running Ollama service
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    options: CompletionOptions,
}

impl OllamaClient {
    /// Build a client for the given endpoint and model
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> AssistantResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|e| AssistantError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options: CompletionOptions::default(),
        })
    }

    /// Client for the default local endpoint and model
    pub fn default_local() -> AssistantResult<Self> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    /// Override the sampling options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .http
            .get(&url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), "completion service health check failed");
                false
            }
            Err(e) => {
                debug!(error = %e, "completion service unreachable");
                false
            }
        }
    }

    async fn complete(&self, prompt: &str) -> AssistantResult<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
            stream: false,
            options: &self.options,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AssistantError::ServiceUnavailable(format!(
                "completion call returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::ServiceUnavailable(e.to_string()))?;

        let reply = body
            .message
            .map(|m| m.content)
            .or(body.response)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(AssistantError::ServiceUnavailable(
                "empty reply from completion service".to_string(),
            ));
        }

        Ok(reply)
    }
}

/// Scripted client for tests: fixed reply or permanent unavailability
#[cfg(test)]
pub struct MockCompletionClient {
    reply: Option<String>,
}

#[cfg(test)]
impl MockCompletionClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self { reply: None }
    }
}

#[cfg(test)]
#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn is_available(&self) -> bool {
        self.reply.is_some()
    }

    async fn complete(&self, _prompt: &str) -> AssistantResult<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(AssistantError::ServiceUnavailable(
                "mock service down".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_up_and_down() {
        let mut server = mockito::Server::new_async().await;
        let client = OllamaClient::new(server.url(), "llama3:latest").unwrap();

        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;
        assert!(client.is_available().await);
        mock.remove_async().await;

        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(503)
            .create_async()
            .await;
        assert!(!client.is_available().await);
    }

    #[tokio::test]
    async fn test_complete_reads_message_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"content":"Drink some water."}}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "llama3:latest").unwrap();
        let reply = client.complete("prompt").await.unwrap();
        assert_eq!(reply, "Drink some water.");
    }

    #[tokio::test]
    async fn test_complete_falls_back_to_response_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Rest today."}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "llama3:latest").unwrap();
        let reply = client.complete("prompt").await.unwrap();
        assert_eq!(reply, "Rest today.");
    }

    #[tokio::test]
    async fn test_empty_reply_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"content":"  "}}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "llama3:latest").unwrap();
        assert!(matches!(
            client.complete("prompt").await.unwrap_err(),
            AssistantError::ServiceUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "llama3:latest").unwrap();
        assert!(matches!(
            client.complete("prompt").await.unwrap_err(),
            AssistantError::ServiceUnavailable(_)
        ));
    }
}
