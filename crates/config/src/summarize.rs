//! Summarization pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Batcher options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeConfig {
    /// Articles fetched per batch page
    pub batch_size: usize,
    /// Failures before an article is blocked from further attempts
    pub max_failures: u32,
    /// How long a blocked article stays blocked (seconds)
    pub failure_block_secs: u64,
    /// Language tag for placeholder summaries
    pub placeholder_language: String,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_failures: 3,
            failure_block_secs: 3600,
            placeholder_language: "ja".to_string(),
        }
    }
}

impl SummarizeConfig {
    pub fn failure_block(&self) -> Duration {
        Duration::from_secs(self.failure_block_secs)
    }
}

/// Job queue worker options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Pending jobs drained per tick
    pub batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { batch_size: 20 }
    }
}

/// Quality judge options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// `(article, summary)` pairs scanned per page
    pub batch_size: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

impl SummarizeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "summarize.batch_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.max_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "summarize.max_failures".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
