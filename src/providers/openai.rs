//! OpenAI-compatible provider implementation
//!
//! Talks to `POST {base_url}/chat/completions` with a bearer key. Whole
//! replies are decoded from JSON; streamed replies are handed to the SSE
//! parser running on its own task.

use super::sse::parse_sse_stream;
use super::{ChatProvider, ChatRequest, Completion, StreamChunk};
use crate::config::ProviderConfig;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// OpenAI-compatible API provider
///
/// # Examples
///
/// ```no_run
/// use deepchat::config::ProviderConfig;
/// use deepchat::conversation::ApiMessage;
/// use deepchat::providers::{build_request, ChatProvider, OpenAiProvider};
///
/// # async fn example() -> deepchat::error::Result<()> {
/// let config = ProviderConfig {
///     api_key: "sk-...".to_string(),
///     ..ProviderConfig::default()
/// };
/// let provider = OpenAiProvider::new(&config)?;
/// let request = build_request(&config, vec![ApiMessage::user("Hello!")], false);
/// let completion = provider.complete(&request).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider from settings
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("deepchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_empty() {
            tracing::warn!("No API key configured; requests will be sent unauthenticated");
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Sending chat completion request"
        );

        let mut builder = self.client.post(&self.endpoint).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Chat completion request failed: {}", e);
            ChatError::Provider(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("API returned error {}: {}", status, error_text);
            return Err(ChatError::Provider(format!(
                "API returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        let request = ChatRequest {
            stream: false,
            ..request.clone()
        };
        let response = self.send(&request).await?;

        let body: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            ChatError::Provider(format!("Failed to parse response: {}", e))
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Provider("Response contained no choices".to_string()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            reasoning: choice.message.reasoning_content.filter(|r| !r.trim().is_empty()),
        })
    }

    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamChunk>>> {
        let request = ChatRequest {
            stream: true,
            ..request.clone()
        };
        let response = self.send(&request).await?;

        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            parse_sse_stream(byte_stream, chunk_tx).await;
        });

        Ok(Box::pin(UnboundedReceiverStream::new(chunk_rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ProviderConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            ..ProviderConfig::default()
        };
        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());

        let body: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(body.choices.is_empty());
    }
}
