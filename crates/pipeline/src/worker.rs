//! Summarize job queue worker
//!
//! Drains pending jobs written by other subsystems. The repository owns
//! the retry policy: a `failed` update transitions back to `pending` while
//! retries remain and to `dead_letter` at the ceiling. An overloaded
//! summarizer aborts the rest of the batch so the scheduler backs off.

use std::sync::Arc;

use newsflow_core::clock::SharedClock;
use newsflow_core::{
    ArticleRepository, ArticleSummary, CancelToken, JobStatus, Priority, Result,
    SummarizeError, SummarizeJobRepository, SummarizerService, SummaryRepository,
};
use newsflow_config::WorkerConfig;

use crate::html::{extract_text, looks_like_html};

/// Queue-draining worker
pub struct QueueWorker {
    jobs: Arc<dyn SummarizeJobRepository>,
    articles: Arc<dyn ArticleRepository>,
    summaries: Arc<dyn SummaryRepository>,
    summarizer: Arc<dyn SummarizerService>,
    config: WorkerConfig,
    clock: SharedClock,
}

impl QueueWorker {
    pub fn new(
        jobs: Arc<dyn SummarizeJobRepository>,
        articles: Arc<dyn ArticleRepository>,
        summaries: Arc<dyn SummaryRepository>,
        summarizer: Arc<dyn SummarizerService>,
        config: WorkerConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            jobs,
            articles,
            summaries,
            summarizer,
            config,
            clock,
        }
    }

    /// Drain one batch of pending jobs
    pub async fn process_queue(&self, cancel: &CancelToken) -> Result<()> {
        let jobs = self.jobs.get_pending_jobs(self.config.batch_size).await?;
        if jobs.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = jobs.len(), "draining summarize jobs");

        for job in jobs {
            if cancel.is_cancelled() {
                tracing::info!("queue drain cancelled");
                return Ok(());
            }

            self.jobs
                .update_job_status(&job.job_id, JobStatus::Running, None, None)
                .await?;

            let article = match self.articles.find_by_id(&job.article_id).await? {
                Some(article) if article.has_content() => article,
                _ => {
                    self.jobs
                        .update_job_status(
                            &job.job_id,
                            JobStatus::Failed,
                            None,
                            Some(format!("article {} missing or empty", job.article_id)),
                        )
                        .await?;
                    continue;
                }
            };

            let mut article = article;
            if looks_like_html(&article.content) {
                let text = extract_text(&article.content);
                // Empty extraction falls back to the raw content
                if !text.is_empty() {
                    article.content = text;
                }
            }

            match self
                .summarizer
                .summarize_article(&article, Priority::Low)
                .await
            {
                Ok(summarized) => {
                    // A failed save must not lose the finished summary; the
                    // job still completes with the result attached.
                    let record = ArticleSummary {
                        id: uuid::Uuid::new_v4().to_string(),
                        article_id: article.id.clone(),
                        user_id: self.summarizer.system_user_id().to_string(),
                        summary: summarized.summary.clone(),
                        language: summarized.language.clone(),
                        created_at: self.clock.now(),
                    };
                    if let Err(e) = self.summaries.create(&record).await {
                        tracing::warn!(
                            job_id = %job.job_id,
                            article_id = %article.id,
                            error = %e,
                            "summary save failed, completing job anyway"
                        );
                    }
                    self.jobs
                        .update_job_status(
                            &job.job_id,
                            JobStatus::Completed,
                            Some(summarized.summary),
                            None,
                        )
                        .await?;
                }
                Err(SummarizeError::ServiceOverloaded) => {
                    self.jobs
                        .update_job_status(
                            &job.job_id,
                            JobStatus::Failed,
                            None,
                            Some(SummarizeError::ServiceOverloaded.to_string()),
                        )
                        .await?;
                    tracing::warn!(
                        job_id = %job.job_id,
                        "summarizer overloaded, aborting batch"
                    );
                    return Err(SummarizeError::ServiceOverloaded.into());
                }
                Err(e) => {
                    self.jobs
                        .update_job_status(
                            &job.job_id,
                            JobStatus::Failed,
                            None,
                            Some(e.to_string()),
                        )
                        .await?;
                }
            }
        }

        Ok(())
    }
}
