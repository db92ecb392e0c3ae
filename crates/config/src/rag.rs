//! RAG indexer and retriever configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Retriever options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Per-query ANN limit
    pub search_limit: usize,
    /// Slots filled from the original-query ranked list
    pub quota_original: usize,
    /// Slots filled from the RRF-merged expanded lists
    pub quota_expanded: usize,
    /// RRF k parameter
    pub rrf_k: f32,
    /// Enable cross-encoder reranking
    pub rerank_enabled: bool,
    /// Candidates kept after reranking
    pub rerank_top_k: usize,
    /// Reranker deadline; on expiry the pipeline proceeds unreranked
    pub rerank_timeout_secs: u64,
    /// Boost recent articles (always on in the digest variant)
    pub temporal_boost: bool,
    /// Expanded variants requested per language from the expander
    pub expansion_count: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            search_limit: 50,
            quota_original: 5,
            quota_expanded: 5,
            rrf_k: 60.0,
            rerank_enabled: true,
            rerank_top_k: 10,
            rerank_timeout_secs: 30,
            temporal_boost: false,
            expansion_count: 3,
        }
    }
}

impl RetrieverConfig {
    pub fn rerank_timeout(&self) -> Duration {
        Duration::from_secs(self.rerank_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quota_original + self.quota_expanded > 20 {
            return Err(ConfigError::InvalidValue {
                field: "rag.quota_original + rag.quota_expanded".to_string(),
                message: "combined quota must not exceed 20".to_string(),
            });
        }
        if self.search_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.search_limit".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.rrf_k <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.rrf_k".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Indexer options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Soft ceiling on chunk length, in characters
    pub max_chunk_chars: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1200,
        }
    }
}
