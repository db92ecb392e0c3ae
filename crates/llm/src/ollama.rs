//! Ollama backend
//!
//! Implements the core `LlmClient` contract against a local Ollama server.
//! Streaming responses arrive as NDJSON; fragments may split lines, so a
//! carry buffer reassembles them before parsing.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use newsflow_core::{
    CancelToken, ChatChunk, ChatRequest, ChatStream, GenerateRequest, GenerateResponse,
    LlmClient, Message, Result, Role,
};

use crate::LlmError;

/// Ollama client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature
    pub temperature: f32,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration, doubles each retry (milliseconds)
    pub initial_backoff_ms: u64,
    /// Health endpoint path; must answer JSON with a non-empty `models`
    /// array (deployment choice, `/api/tags` by default)
    pub health_path: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5:7b-instruct-q4_K_M".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 120,
            max_retries: 3,
            initial_backoff_ms: 100,
            health_path: "/api/tags".to_string(),
        }
    }
}

/// Ollama-backed LLM client
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> std::result::Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn options(&self, max_tokens: Option<u32>, temperature: Option<f32>) -> OllamaOptions {
        OllamaOptions {
            temperature: Some(temperature.unwrap_or(self.config.temperature)),
            num_predict: Some(max_tokens.unwrap_or(self.config.max_tokens) as i32),
        }
    }

    async fn execute_chat(
        &self,
        request: &OllamaChatRequest,
    ) -> std::result::Result<OllamaChatResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/chat"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {status}: {error}")));
            }
            return Err(LlmError::Api(error));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Retry loop with exponential backoff around one chat call
    async fn chat_with_retry(
        &self,
        request: OllamaChatRequest,
    ) -> std::result::Result<OllamaChatResponse, LlmError> {
        let mut last_error = None;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempt,
                    max = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "LLM request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_chat(&request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("max retries exceeded".to_string())))
    }

    fn stream_request(&self, messages: Vec<OllamaMessage>, options: OllamaOptions) -> ChatStream {
        let client = self.client.clone();
        let url = self.api_url("/chat");
        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: true,
            options: Some(options),
        };

        Box::pin(async_stream::try_stream! {
            let response = client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(LlmError::from)?;

            if !response.status().is_success() {
                let error = response.text().await.unwrap_or_default();
                Err(LlmError::Api(error))?;
                return;
            }

            let mut byte_stream = response.bytes_stream();
            // NDJSON lines can be split across network fragments
            let mut carry = String::new();

            'read: while let Some(fragment) = byte_stream.next().await {
                let fragment = fragment.map_err(LlmError::from)?;
                carry.push_str(&String::from_utf8_lossy(&fragment));

                while let Some(newline) = carry.find('\n') {
                    let line: String = carry.drain(..=newline).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let chunk: OllamaStreamChunk = serde_json::from_str(line)
                        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
                    let done = chunk.done;
                    yield ChatChunk {
                        response: chunk.message.content,
                        thinking: chunk.message.thinking.unwrap_or_default(),
                        done,
                    };
                    if done {
                        break 'read;
                    }
                }
            }
        })
    }

    /// Poll the health endpoint every 10 s until the backend reports at
    /// least one loaded model, or the token cancels.
    pub async fn wait_until_ready(&self, cancel: &CancelToken) -> Result<()> {
        let mut ticker = tokio::time::interval(Duration::from_secs(10));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(newsflow_core::Error::Cancelled),
                _ = ticker.tick() => {
                    match self.check_health().await {
                        Ok(()) => return Ok(()),
                        Err(e) => tracing::debug!(error = %e, "LLM backend not ready"),
                    }
                }
            }
        }
    }

    /// One health probe: JSON body with a non-empty `models` array
    pub async fn check_health(&self) -> std::result::Result<(), LlmError> {
        let url = format!(
            "{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.health_path
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LlmError::Api(format!(
                "health endpoint answered {}",
                response.status()
            )));
        }

        let body: HealthResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        if body.models.is_empty() {
            return Err(LlmError::ModelNotFound("no models loaded".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        // /api/generate and /api/chat converge for single prompts; chat
        // keeps one wire path.
        let chat = ChatRequest {
            messages: vec![Message::user(request.prompt)],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            model: request.model,
        };
        self.chat(chat).await
    }

    fn generate_stream(&self, request: GenerateRequest) -> ChatStream {
        let options = self.options(request.max_tokens, request.temperature);
        let messages = vec![OllamaMessage {
            role: "user".to_string(),
            content: request.prompt,
            thinking: None,
        }];
        self.stream_request(messages, options)
    }

    async fn chat(&self, request: ChatRequest) -> Result<GenerateResponse> {
        let ollama_request = OllamaChatRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            messages: request.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: Some(self.options(request.max_tokens, request.temperature)),
        };

        let response = self.chat_with_retry(ollama_request).await?;
        Ok(GenerateResponse {
            text: response.message.content,
            done: response.done,
        })
    }

    fn chat_stream(&self, request: ChatRequest) -> ChatStream {
        let options = self.options(request.max_tokens, request.temperature);
        let messages = request.messages.iter().map(OllamaMessage::from).collect();
        self.stream_request(messages, options)
    }

    async fn is_available(&self) -> bool {
        self.check_health().await.is_ok()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thinking: Option<String>,
}

impl From<&Message> for OllamaMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: msg.content.clone(),
            thinking: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaStreamChunk {
    message: OllamaMessage,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    models: Vec<serde_json::Value>,
}
