//! Answerer configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Streaming answerer options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Default cap on contexts included in the prompt
    pub max_chunks: usize,
    /// Default generation token budget
    pub max_tokens: u32,
    /// Heartbeat interval for the event stream (seconds).
    /// Must stay under ~30 s write-idle proxy timeouts; 10-15 s target.
    pub heartbeat_secs: u64,
    /// Bounded event-channel capacity
    pub channel_capacity: usize,
    /// Answer cache TTL (seconds)
    pub cache_ttl_secs: u64,
    /// Answer cache entry bound
    pub cache_capacity: usize,
    /// Default locale for prompts and placeholders
    pub locale: String,
    /// Digest variant: rank topics from the past N hours
    pub digest_window_hours: u32,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_chunks: 10,
            max_tokens: 1024,
            heartbeat_secs: 12,
            channel_capacity: 32,
            cache_ttl_secs: 600,
            cache_capacity: 512,
            locale: "ja".to_string(),
            digest_window_hours: 24,
        }
    }
}

impl AnswerConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Middleboxes with ~30 s write-idle timeouts must see traffic sooner.
        if self.heartbeat_secs == 0 || self.heartbeat_secs > 15 {
            return Err(ConfigError::InvalidValue {
                field: "answer.heartbeat_secs".to_string(),
                message: "must be in 1..=15".to_string(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "answer.channel_capacity".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
