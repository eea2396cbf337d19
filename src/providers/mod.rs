//! Chat completion providers
//!
//! A provider turns a [`ChatRequest`] into either a whole [`Completion`] or
//! a stream of [`StreamChunk`]s. The only implementation speaks the
//! OpenAI-compatible `/chat/completions` API used by DeepSeek.

pub mod openai;
pub mod sse;

pub use openai::OpenAiProvider;

use crate::config::{is_reasoner_model, ProviderConfig, CHAT_MODEL};
use crate::conversation::{ApiMessage, Turn};
use crate::error::Result;
use crate::history::summary::{clean_generated_title, title_messages};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Prompt sent by the connection test
pub const CONNECTION_TEST_PROMPT: &str = "你好！请回复'连接成功'";

/// Request body for `/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingParam>,
}

/// Extended-thinking switch for models that reason on request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingParam {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ThinkingParam {
    pub fn enabled() -> Self {
        Self {
            kind: "enabled".to_string(),
        }
    }
}

/// A finished, non-streamed reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    pub content: String,
    pub reasoning: Option<String>,
}

impl Completion {
    /// The assistant turn to commit for this reply
    pub fn into_turn(self) -> Turn {
        Turn::assistant_with_reasoning(self.content, self.reasoning.unwrap_or_default())
    }
}

/// One delta of a streamed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Reasoning(String),
    Answer(String),
}

/// Builds a request from provider settings
///
/// The thinking switch is only sent for non-reasoner models with thinking
/// enabled; the reasoner always reasons.
///
/// # Examples
///
/// ```
/// use deepchat::config::ProviderConfig;
/// use deepchat::conversation::ApiMessage;
/// use deepchat::providers::build_request;
///
/// let mut config = ProviderConfig::default();
/// config.thinking_enabled = true;
/// let request = build_request(&config, vec![ApiMessage::user("hi")], true);
/// assert!(request.thinking.is_some());
/// ```
pub fn build_request(
    config: &ProviderConfig,
    messages: Vec<ApiMessage>,
    stream: bool,
) -> ChatRequest {
    let thinking = (config.thinking_enabled && !is_reasoner_model(&config.model))
        .then(ThinkingParam::enabled);
    ChatRequest {
        model: config.model.clone(),
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        stream,
        thinking,
    }
}

/// Chat completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Requests a whole reply
    async fn complete(&self, request: &ChatRequest) -> Result<Completion>;

    /// Requests a streamed reply
    ///
    /// The returned stream yields deltas in arrival order and ends when the
    /// server finishes. A transport failure mid-stream is yielded as an error
    /// item.
    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamChunk>>>;

    /// Sends a tiny prompt and returns the reply text
    async fn test_connection(&self, model: &str) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ApiMessage::user(CONNECTION_TEST_PROMPT)],
            max_tokens: 10,
            temperature: 0.1,
            stream: false,
            thinking: None,
        };
        Ok(self.complete(&request).await?.content)
    }

    /// Asks the model for a short title summarizing `turns`
    ///
    /// Uses the chat model when the session runs the reasoner. Returns `None`
    /// when there is nothing to summarize or the reply is unusable. An empty
    /// answer falls back to the reasoning text.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_trait::async_trait;
    /// use deepchat::conversation::Turn;
    /// use deepchat::providers::{ChatProvider, ChatRequest, Completion, StreamChunk};
    /// use futures::stream::BoxStream;
    ///
    /// struct Fixed;
    ///
    /// #[async_trait]
    /// impl ChatProvider for Fixed {
    ///     async fn complete(&self, _request: &ChatRequest) -> deepchat::Result<Completion> {
    ///         Ok(Completion {
    ///             content: "\"Rust 所有权\"".to_string(),
    ///             reasoning: None,
    ///         })
    ///     }
    ///
    ///     async fn stream(
    ///         &self,
    ///         _request: &ChatRequest,
    ///     ) -> deepchat::Result<BoxStream<'static, deepchat::Result<StreamChunk>>> {
    ///         Ok(Box::pin(futures::stream::empty()))
    ///     }
    /// }
    ///
    /// let turns = [Turn::user("讲讲所有权"), Turn::assistant("所有权是...")];
    /// let title = tokio_test::block_on(Fixed.generate_title(&turns, "deepseek-reasoner"));
    /// assert_eq!(title.unwrap().as_deref(), Some("Rust 所有权"));
    /// ```
    async fn generate_title(&self, turns: &[Turn], model: &str) -> Result<Option<String>> {
        let Some(messages) = title_messages(turns) else {
            return Ok(None);
        };
        let model = if is_reasoner_model(model) {
            CHAT_MODEL
        } else {
            model
        };
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            max_tokens: 50,
            temperature: 0.7,
            stream: false,
            thinking: None,
        };

        let completion = self.complete(&request).await?;
        let raw = if completion.content.trim().is_empty() {
            completion.reasoning.unwrap_or_default()
        } else {
            completion.content
        };
        let title = clean_generated_title(&raw);
        tracing::debug!(?title, "Generated conversation title");
        Ok(title)
    }
}
