//! LLM backend integration
//!
//! Features:
//! - Ollama chat/generate with streaming NDJSON parsing
//! - Bounded retry with exponential backoff for transient failures
//! - Health wait loop gating pipeline startup on model availability

pub mod ollama;

pub use ollama::{OllamaClient, OllamaConfig};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Transient failures worth a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Timeout)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for newsflow_core::Error {
    fn from(err: LlmError) -> Self {
        newsflow_core::Error::Llm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Network("reset".into()).is_retryable());
        assert!(LlmError::Timeout.is_retryable());
        assert!(!LlmError::Api("bad request".into()).is_retryable());
        assert!(!LlmError::Configuration("no endpoint".into()).is_retryable());
    }
}
