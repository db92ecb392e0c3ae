//! Summarization pipeline
//!
//! This crate provides the batch side of the content pipeline:
//! - Cursor-paged summarization batcher with per-article failure blocking
//! - Job queue worker draining pending summarize jobs
//! - Quality judge removing low-quality summaries
//! - HTML to plain-text extraction
//! - Origin feed sync (disabled by policy, exposed as a stub)

pub mod batcher;
pub mod failure;
pub mod feed;
pub mod html;
pub mod judge;
pub mod worker;

pub use batcher::{BatchResult, SummarizeBatcher};
pub use failure::FailureTracker;
pub use feed::FeedSyncService;
pub use html::{extract_text, looks_like_html};
pub use judge::{JudgeResult, QualityJudge};
pub use worker::QueueWorker;

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Batch error: {0}")]
    Batch(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Judge error: {0}")]
    Judge(String),

    #[error("Feed sync is disabled by policy")]
    FeedSyncDisabled,
}

impl From<PipelineError> for newsflow_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::FeedSyncDisabled => {
                newsflow_core::Error::FeatureDisabled("feed sync".to_string())
            }
            other => newsflow_core::Error::Summarize(
                newsflow_core::SummarizeError::Failed(other.to_string()),
            ),
        }
    }
}
