//! Summary quality judge
//!
//! Pages `(article, summary)` pairs and asks the LLM-backed scorer to
//! judge each one. The scorer removes a below-threshold summary itself;
//! the judge verifies by re-reading and tallies retained vs removed.
//! Scoring errors are tolerated per item.

use std::sync::Arc;

use parking_lot::Mutex;

use newsflow_core::{CancelToken, Cursor, Result, SummaryQualityScorer, SummaryRepository};
use newsflow_config::JudgeConfig;

/// Outcome of one judging pass
#[derive(Debug, Clone, Default)]
pub struct JudgeResult {
    /// Summaries that survived scoring
    pub retained: usize,
    /// Summaries the scorer removed
    pub removed: usize,
    /// Items whose scoring failed
    pub error: usize,
    /// Whether another page remains
    pub has_more: bool,
}

/// Paged quality judge
pub struct QualityJudge {
    summaries: Arc<dyn SummaryRepository>,
    scorer: Arc<dyn SummaryQualityScorer>,
    config: JudgeConfig,
    cursor: Mutex<Cursor>,
}

impl QualityJudge {
    pub fn new(
        summaries: Arc<dyn SummaryRepository>,
        scorer: Arc<dyn SummaryQualityScorer>,
        config: JudgeConfig,
    ) -> Self {
        Self {
            summaries,
            scorer,
            config,
            cursor: Mutex::new(Cursor::start()),
        }
    }

    /// Current scan position
    pub fn cursor(&self) -> Cursor {
        self.cursor.lock().clone()
    }

    /// Resume a previous scan
    pub fn restore_cursor(&self, cursor: Cursor) {
        *self.cursor.lock() = cursor;
    }

    /// Judge one page of summaries
    pub async fn check_quality(&self, cancel: &CancelToken) -> Result<JudgeResult> {
        let cursor = self.cursor();
        let (pairs, next_cursor) = self
            .summaries
            .find_articles_with_summaries(&cursor, self.config.batch_size)
            .await?;

        let mut result = JudgeResult {
            has_more: next_cursor.is_some(),
            ..Default::default()
        };

        for pair in &pairs {
            if cancel.is_cancelled() {
                tracing::info!(
                    retained = result.retained,
                    removed = result.removed,
                    "quality check cancelled, returning partial result"
                );
                return Ok(result);
            }

            match self.scorer.score_summary(&pair.article, &pair.summary).await {
                Ok(()) => {
                    // The scorer deletes sub-threshold summaries itself;
                    // verify the outcome by re-reading.
                    if self.summaries.exists(&pair.summary.id).await? {
                        result.retained += 1;
                    } else {
                        tracing::debug!(
                            summary_id = %pair.summary.id,
                            article_id = %pair.article.id,
                            "low-quality summary removed"
                        );
                        result.removed += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        summary_id = %pair.summary.id,
                        error = %e,
                        "quality scoring failed"
                    );
                    result.error += 1;
                }
            }
        }

        *self.cursor.lock() = next_cursor.unwrap_or_default();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use newsflow_core::{
        cancel_pair, Article, ArticleSummary, ArticleWithSummary, Error,
    };
    use std::collections::HashSet;

    struct MockSummaries {
        pairs: Vec<ArticleWithSummary>,
        /// Summary ids still live; the scorer removes from this set
        live: Arc<Mutex<HashSet<String>>>,
    }

    #[async_trait]
    impl SummaryRepository for MockSummaries {
        async fn create(&self, _summary: &ArticleSummary) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.live.lock().remove(id);
            Ok(())
        }

        async fn exists(&self, id: &str) -> Result<bool> {
            Ok(self.live.lock().contains(id))
        }

        async fn find_articles_with_summaries(
            &self,
            _cursor: &Cursor,
            limit: usize,
        ) -> Result<(Vec<ArticleWithSummary>, Option<Cursor>)> {
            let page: Vec<_> = self.pairs.iter().take(limit).cloned().collect();
            Ok((page, None))
        }
    }

    /// Scorer that deletes summaries listed in `remove`, errors on `fail`
    struct MockScorer {
        live: Arc<Mutex<HashSet<String>>>,
        remove: HashSet<String>,
        fail: HashSet<String>,
    }

    #[async_trait]
    impl SummaryQualityScorer for MockScorer {
        async fn score_summary(
            &self,
            _article: &Article,
            summary: &ArticleSummary,
        ) -> Result<()> {
            if self.fail.contains(&summary.id) {
                return Err(Error::Llm("scorer unavailable".into()));
            }
            if self.remove.contains(&summary.id) {
                self.live.lock().remove(&summary.id);
            }
            Ok(())
        }
    }

    fn pair(id: &str) -> ArticleWithSummary {
        ArticleWithSummary {
            article: Article {
                id: format!("article-{id}"),
                user_id: "u-1".to_string(),
                title: "t".to_string(),
                url: "https://news.example.com".to_string(),
                content: "body".to_string(),
                published_at: Utc::now(),
            },
            summary: ArticleSummary {
                id: id.to_string(),
                article_id: format!("article-{id}"),
                user_id: "u-1".to_string(),
                summary: "summary".to_string(),
                language: "ja".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    fn judge(
        pairs: Vec<ArticleWithSummary>,
        remove: &[&str],
        fail: &[&str],
    ) -> QualityJudge {
        let live: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(
            pairs.iter().map(|p| p.summary.id.clone()).collect(),
        ));
        let summaries = Arc::new(MockSummaries {
            pairs,
            live: live.clone(),
        });
        let scorer = Arc::new(MockScorer {
            live,
            remove: remove.iter().map(|s| s.to_string()).collect(),
            fail: fail.iter().map(|s| s.to_string()).collect(),
        });
        QualityJudge::new(summaries, scorer, JudgeConfig::default())
    }

    #[tokio::test]
    async fn test_retained_and_removed_counts() {
        let judge = judge(vec![pair("s-1"), pair("s-2"), pair("s-3")], &["s-2"], &[]);
        let (_handle, cancel) = cancel_pair();

        let result = judge.check_quality(&cancel).await.unwrap();
        assert_eq!(result.retained, 2);
        assert_eq!(result.removed, 1);
        assert_eq!(result.error, 0);
    }

    #[tokio::test]
    async fn test_scoring_error_continues() {
        let judge = judge(vec![pair("s-1"), pair("s-2")], &[], &["s-1"]);
        let (_handle, cancel) = cancel_pair();

        let result = judge.check_quality(&cancel).await.unwrap();
        assert_eq!(result.error, 1);
        assert_eq!(result.retained, 1);
    }

    #[tokio::test]
    async fn test_cancel_returns_partial() {
        let judge = judge(vec![pair("s-1")], &[], &[]);
        let (handle, cancel) = cancel_pair();
        handle.cancel();

        let result = judge.check_quality(&cancel).await.unwrap();
        assert_eq!(result.retained, 0);
        assert_eq!(result.removed, 0);
    }
}
