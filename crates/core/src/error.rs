//! Error types shared across the workspace
//!
//! Each crate defines its own `thiserror` enum and converts into this
//! top-level `Error` at the crate boundary.

use thiserror::Error;

/// Workspace-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the newsflow core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Egress error: {0}")]
    Egress(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Retrieval error: {0}")]
    Retrieve(String),

    #[error("Answer error: {0}")]
    Answer(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether the operation may succeed if retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Summarize(e) => e.is_retryable(),
            Error::Egress(_) | Error::Llm(_) | Error::Repository(_) => true,
            _ => false,
        }
    }
}

/// Errors surfaced by the external summarizer service
///
/// `ContentTooShort` / `ContentTooLong` are content-shape signals handled
/// locally by the batcher (placeholder write, not a failure).
/// `ServiceOverloaded` aborts the current batch so the scheduler backs off.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("content too short to summarize")]
    ContentTooShort,

    #[error("content too long to summarize")]
    ContentTooLong,

    #[error("summarization service overloaded")]
    ServiceOverloaded,

    #[error("summarization failed: {0}")]
    Failed(String),
}

impl SummarizeError {
    /// Content-shape errors are handled with a placeholder, never retried
    pub fn is_content_shape(&self) -> bool {
        matches!(
            self,
            SummarizeError::ContentTooShort | SummarizeError::ContentTooLong
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SummarizeError::ServiceOverloaded)
    }
}
