//! Repository contracts
//!
//! Persistence drivers implement these; the core holds only trait objects.
//! Each entity is owned by its repository, and services pass identifiers
//! across component boundaries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::{
    Article, ArticleSummary, ArticleWithSummary, Cursor, JobStatus, RagChunk, RagChunkEvent,
    RagDocument, RagDocumentVersion, Result, SearchResult, SummarizeJob,
};

/// Article persistence
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Page articles that have no live summary yet
    async fn find_for_summarization(
        &self,
        cursor: &Cursor,
        limit: usize,
    ) -> Result<(Vec<Article>, Option<Cursor>)>;

    /// Whether any un-summarized articles remain
    async fn has_unsummarized_articles(&self) -> Result<bool>;

    /// Load one article
    async fn find_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// Whether any of the given URLs is already ingested
    async fn check_exists(&self, urls: &[String]) -> Result<bool>;

    /// Pull articles from the origin sync feed
    async fn fetch_inoreader_articles(&self, since: DateTime<Utc>) -> Result<Vec<Article>>;

    /// Idempotently persist a batch of articles
    async fn upsert_articles(&self, articles: &[Article]) -> Result<()>;
}

/// Summary persistence
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Persist a new summary
    async fn create(&self, summary: &ArticleSummary) -> Result<()>;

    /// Remove a summary
    async fn delete(&self, id: &str) -> Result<()>;

    /// Whether the summary still exists
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Page `(article, summary)` pairs for the quality judge
    async fn find_articles_with_summaries(
        &self,
        cursor: &Cursor,
        limit: usize,
    ) -> Result<(Vec<ArticleWithSummary>, Option<Cursor>)>;
}

/// Summarize job queue persistence
///
/// `update_job_status` applies the retry policy atomically: a `failed`
/// update transitions the row back to `pending` while retries remain and to
/// `dead_letter` once `retry_count + 1 >= max_retries`.
#[async_trait]
pub trait SummarizeJobRepository: Send + Sync {
    /// Drain up to `limit` pending jobs, oldest first
    async fn get_pending_jobs(&self, limit: usize) -> Result<Vec<SummarizeJob>>;

    /// Transition a job, recording result or error
    async fn update_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<String>,
        error: Option<String>,
    ) -> Result<()>;
}

/// Feed-sync bookkeeping
#[async_trait]
pub trait FeedRepository: Send + Sync {
    async fn get_processing_stats(&self) -> Result<ProcessingStats>;
}

/// Feed processing counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total: u64,
    pub processed: u64,
    pub remaining: u64,
}

/// RAG document persistence
#[async_trait]
pub trait RagDocumentRepository: Send + Sync {
    async fn get_by_article_id(&self, article_id: &str) -> Result<Option<RagDocument>>;

    async fn create_document(&self, document: &RagDocument) -> Result<()>;

    async fn create_version(&self, version: &RagDocumentVersion) -> Result<()>;

    async fn get_latest_version(&self, document_id: &str)
        -> Result<Option<RagDocumentVersion>>;

    async fn update_current_version(&self, document_id: &str, version_id: &str) -> Result<()>;
}

/// RAG chunk persistence and ANN search
#[async_trait]
pub trait RagChunkRepository: Send + Sync {
    async fn bulk_insert_chunks(&self, chunks: &[RagChunk]) -> Result<()>;

    async fn get_chunks_by_version_id(&self, version_id: &str) -> Result<Vec<RagChunk>>;

    /// Append diff events; the log is append-only per document
    async fn insert_events(&self, events: &[RagChunkEvent]) -> Result<()>;

    /// ANN search over current-version chunks
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// ANN search restricted to the given articles
    async fn search_within_articles(
        &self,
        vector: &[f32],
        article_ids: &[String],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
}

/// Transaction boundary
///
/// The work future runs inside one transaction; repositories are expected
/// to enlist in the ambient transaction (a driver concern). On error the
/// transaction aborts and no partial state is observable.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn run_in_tx<'a>(&'a self, work: BoxFuture<'a, Result<()>>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PassthroughTx;

    #[async_trait]
    impl TransactionManager for PassthroughTx {
        async fn run_in_tx<'a>(&'a self, work: BoxFuture<'a, Result<()>>) -> Result<()> {
            work.await
        }
    }

    #[tokio::test]
    async fn test_passthrough_tx_runs_work() {
        let tx = PassthroughTx;
        let mut ran = false;
        tx.run_in_tx(Box::pin(async {
            ran = true;
            Ok(())
        }))
        .await
        .unwrap();
        assert!(ran);
    }

    #[tokio::test]
    async fn test_tx_propagates_error() {
        let tx = PassthroughTx;
        let err = tx
            .run_in_tx(Box::pin(async { Err(crate::Error::Repository("down".into())) }))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Repository(_)));
    }
}
