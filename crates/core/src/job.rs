//! Summarize job queue types
//!
//! State machine: `pending → running → {completed | failed}`. On `failed`
//! the repository transitions back to `pending` while retries remain,
//! otherwise to `dead_letter`. Dead-letter jobs are skipped by future
//! draws until a separate operator action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    DeadLetter,
}

impl JobStatus {
    /// Terminal states are never drained again
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::DeadLetter)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::DeadLetter => "dead_letter",
        };
        f.write_str(s)
    }
}

/// Queued summarization work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeJob {
    /// Unique job ID
    pub job_id: String,
    /// Target article
    pub article_id: String,
    /// Current status
    pub status: JobStatus,
    /// Attempts so far
    pub retry_count: u32,
    /// Attempt ceiling; reaching it dead-letters the job
    pub max_retries: u32,
    /// Last failure message, if any
    pub last_error: Option<String>,
    /// Summary text on completion
    pub result: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SummarizeJob {
    /// Whether another attempt is allowed
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// The status a failure transitions to, per the retry policy
    pub fn status_after_failure(&self) -> JobStatus {
        if self.retry_count + 1 >= self.max_retries {
            JobStatus::DeadLetter
        } else {
            JobStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(retry_count: u32, max_retries: u32) -> SummarizeJob {
        SummarizeJob {
            job_id: "j-1".to_string(),
            article_id: "a-1".to_string(),
            status: JobStatus::Pending,
            retry_count,
            max_retries,
            last_error: None,
            result: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_retry() {
        assert!(job(0, 3).can_retry());
        assert!(job(2, 3).can_retry());
        assert!(!job(3, 3).can_retry());
    }

    #[test]
    fn test_failure_transition() {
        assert_eq!(job(0, 3).status_after_failure(), JobStatus::Pending);
        assert_eq!(job(1, 3).status_after_failure(), JobStatus::Pending);
        assert_eq!(job(2, 3).status_after_failure(), JobStatus::DeadLetter);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::DeadLetter.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&JobStatus::DeadLetter).unwrap();
        assert_eq!(json, "\"dead_letter\"");
    }
}
