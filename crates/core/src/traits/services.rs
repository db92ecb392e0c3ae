//! External model-service contracts
//!
//! The summarizer, quality scorer, embedder, query expander, keyword search
//! and cross-encoder reranker are remote services; the core depends on
//! these traits only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Article, ArticleSummary, Result, SearchResult, SummarizeError, SummarizedContent};

/// Request priority forwarded to external services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// External summarization service
#[async_trait]
pub trait SummarizerService: Send + Sync {
    /// Summarize one article
    async fn summarize_article(
        &self,
        article: &Article,
        priority: Priority,
    ) -> std::result::Result<SummarizedContent, SummarizeError>;

    /// System user the background pipeline writes summaries as
    fn system_user_id(&self) -> &str;
}

/// LLM-backed summary quality scorer
///
/// The scorer removes the summary itself when it falls below threshold;
/// callers verify the outcome by re-reading the summary.
#[async_trait]
pub trait SummaryQualityScorer: Send + Sync {
    async fn score_summary(&self, article: &Article, summary: &ArticleSummary) -> Result<()>;
}

/// Dense vector encoder
#[async_trait]
pub trait VectorEncoder: Send + Sync {
    /// Encode a batch of texts; output length equals input length
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embedder identifier recorded on document versions
    fn version(&self) -> &str;
}

/// Dedicated query-expansion service
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Produce up to `n_ja` Japanese and `n_en` English query variants
    async fn expand_query(&self, query: &str, n_ja: usize, n_en: usize) -> Result<Vec<String>>;
}

/// Keyword search client used to seed expansion with tags
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// One keyword-search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Cross-encoder reranker
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Re-score candidates against the query, best first
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>>;
}
