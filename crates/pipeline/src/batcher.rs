//! Summarization batcher
//!
//! Pages un-summarized articles and summarizes them at low priority.
//! Articles that keep failing are blocked for a window instead of burning
//! summarizer quota; content-shape rejections are persisted as placeholder
//! summaries and counted as successes. Cancellation stops the loop and
//! returns the partial result without error.

use std::sync::Arc;

use parking_lot::Mutex;

use newsflow_core::clock::SharedClock;
use newsflow_core::{
    ArticleRepository, ArticleSummary, CancelToken, Cursor, Priority, Result, SummarizerService,
    SummaryRepository,
};
use newsflow_config::SummarizeConfig;

use crate::failure::FailureTracker;

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Articles attempted (blocked articles are not counted)
    pub processed: usize,
    /// Summaries persisted, placeholders included
    pub success: usize,
    /// Failed attempts
    pub error: usize,
    /// Failure messages, one per failed article
    pub errors: Vec<String>,
    /// Whether another page remains
    pub has_more: bool,
}

/// Cursor-paged summarization batcher
pub struct SummarizeBatcher {
    articles: Arc<dyn ArticleRepository>,
    summaries: Arc<dyn SummaryRepository>,
    summarizer: Arc<dyn SummarizerService>,
    failures: FailureTracker,
    config: SummarizeConfig,
    clock: SharedClock,
    cursor: Mutex<Cursor>,
}

impl SummarizeBatcher {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        summaries: Arc<dyn SummaryRepository>,
        summarizer: Arc<dyn SummarizerService>,
        config: SummarizeConfig,
        clock: SharedClock,
    ) -> Self {
        let failures =
            FailureTracker::new(config.max_failures, config.failure_block(), clock.clone());
        Self {
            articles,
            summaries,
            summarizer,
            failures,
            config,
            clock,
            cursor: Mutex::new(Cursor::start()),
        }
    }

    /// Current scan position, externalized so a scheduler can persist it
    pub fn cursor(&self) -> Cursor {
        self.cursor.lock().clone()
    }

    /// Resume a previous scan
    pub fn restore_cursor(&self, cursor: Cursor) {
        *self.cursor.lock() = cursor;
    }

    /// Run one batch
    pub async fn summarize_articles(
        &self,
        cancel: &CancelToken,
        batch_size: usize,
    ) -> Result<BatchResult> {
        let cursor = self.cursor();
        let (articles, next_cursor) = self
            .articles
            .find_for_summarization(&cursor, batch_size)
            .await?;

        let mut result = BatchResult {
            has_more: next_cursor.is_some(),
            ..Default::default()
        };

        for article in &articles {
            if cancel.is_cancelled() {
                tracing::info!(
                    processed = result.processed,
                    "summarization batch cancelled, returning partial result"
                );
                return Ok(result);
            }

            if self.failures.is_blocked(&article.id) {
                tracing::debug!(article_id = %article.id, "article blocked, skipping");
                continue;
            }

            result.processed += 1;
            match self
                .summarizer
                .summarize_article(article, Priority::Low)
                .await
            {
                Ok(summarized) => {
                    match self
                        .persist_summary(&article.id, summarized.summary, summarized.language)
                        .await
                    {
                        Ok(()) => {
                            self.failures.clear(&article.id);
                            result.success += 1;
                        }
                        Err(e) => {
                            self.failures.record_failure(&article.id);
                            result.error += 1;
                            result.errors.push(format!("{}: {e}", article.id));
                        }
                    }
                }
                Err(e) if e.is_content_shape() => {
                    let language = self.config.placeholder_language.clone();
                    let placeholder = placeholder_summary(&e, &language);
                    match self
                        .persist_summary(&article.id, placeholder, language)
                        .await
                    {
                        Ok(()) => result.success += 1,
                        Err(e) => {
                            result.error += 1;
                            result.errors.push(format!("{}: {e}", article.id));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(article_id = %article.id, error = %e, "summarization failed");
                    self.failures.record_failure(&article.id);
                    result.error += 1;
                    result.errors.push(format!("{}: {e}", article.id));
                }
            }
        }

        *self.cursor.lock() = next_cursor.unwrap_or_default();
        Ok(result)
    }

    async fn persist_summary(
        &self,
        article_id: &str,
        summary: String,
        language: String,
    ) -> Result<()> {
        let record = ArticleSummary {
            id: uuid::Uuid::new_v4().to_string(),
            article_id: article_id.to_string(),
            user_id: self.summarizer.system_user_id().to_string(),
            summary,
            language,
            created_at: self.clock.now(),
        };
        self.summaries.create(&record).await
    }
}

/// Sentinel text persisted when content cannot be summarized
fn placeholder_summary(error: &newsflow_core::SummarizeError, language: &str) -> String {
    use newsflow_core::SummarizeError;
    match (error, language) {
        (SummarizeError::ContentTooShort, "ja") => {
            "この記事は短すぎるため、要約を生成できませんでした。".to_string()
        }
        (SummarizeError::ContentTooLong, "ja") => {
            "この記事は長すぎるため、要約を生成できませんでした。".to_string()
        }
        (SummarizeError::ContentTooShort, _) => {
            "This article is too short to summarize.".to_string()
        }
        (SummarizeError::ContentTooLong, _) => {
            "This article is too long to summarize.".to_string()
        }
        _ => "No summary is available for this article.".to_string(),
    }
}
