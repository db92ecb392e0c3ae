//! Language-model client contract
//!
//! Implementations:
//! - `OllamaClient` (newsflow-llm) - local Ollama inference
//!
//! The stream variants yield `ChatChunk`s carrying both the response delta
//! and any model "thinking" side-channel text; stream errors arrive as
//! `Err` items.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Single-prompt generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The prompt
    pub prompt: String,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Model override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            model: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }
}

/// Chat-completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Model override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Create a request with a system message
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            max_tokens: None,
            temperature: None,
            model: None,
        }
    }

    /// Add a user message
    pub fn with_user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Completed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text
    pub text: String,
    /// Whether the model signalled normal completion
    pub done: bool,
}

impl GenerateResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: content.into(),
            done: true,
        }
    }
}

/// One fragment of a chat stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Response text delta
    pub response: String,
    /// Model "thinking" side-channel delta
    #[serde(default)]
    pub thinking: String,
    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

/// Boxed chunk stream returned by the stream variants
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatChunk>> + Send>>;

/// Language-model client
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    /// Single-prompt completion
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Single-prompt completion, streamed
    fn generate_stream(&self, request: GenerateRequest) -> ChatStream;

    /// Chat completion
    async fn chat(&self, request: ChatRequest) -> Result<GenerateResponse>;

    /// Chat completion, streamed
    fn chat_stream(&self, request: ChatRequest) -> ChatStream;

    /// Whether the backend is reachable and has a model loaded
    async fn is_available(&self) -> bool;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct MockLlm;

    #[async_trait]
    impl LlmClient for MockLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            Ok(GenerateResponse::text("mock"))
        }

        fn generate_stream(&self, _request: GenerateRequest) -> ChatStream {
            Box::pin(futures::stream::empty())
        }

        async fn chat(&self, _request: ChatRequest) -> Result<GenerateResponse> {
            Ok(GenerateResponse::text("mock"))
        }

        fn chat_stream(&self, _request: ChatRequest) -> ChatStream {
            Box::pin(futures::stream::iter(vec![
                Ok(ChatChunk {
                    response: "hello".to_string(),
                    ..Default::default()
                }),
                Ok(ChatChunk {
                    done: true,
                    ..Default::default()
                }),
            ]))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock-llm"
        }
    }

    #[tokio::test]
    async fn test_mock_llm() {
        let llm = MockLlm;
        assert!(llm.is_available().await);

        let response = llm.chat(ChatRequest::new("sys").with_user_message("hi")).await.unwrap();
        assert_eq!(response.text, "mock");
        assert!(response.done);

        let chunks: Vec<_> = llm
            .chat_stream(ChatRequest::new("sys"))
            .collect::<Vec<_>>()
            .await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].as_ref().unwrap().done);
    }

    #[test]
    fn test_chat_request_builder() {
        let req = ChatRequest::new("system").with_user_message("hi").with_max_tokens(64);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.max_tokens, Some(64));
    }
}
