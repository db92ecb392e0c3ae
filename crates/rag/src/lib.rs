//! RAG indexing and retrieval
//!
//! Features:
//! - Content-addressed document versioning with chunk-level diff events
//! - Deterministic paragraph chunking
//! - Multi-query retrieval with Reciprocal Rank Fusion
//! - Language-aware quota allocation (original vs expanded queries)
//! - Temporal score boosting for the digest variant
//! - Optional cross-encoder reranking with timeout fall-through

pub mod chunker;
pub mod diff;
pub mod hash;
pub mod indexer;
pub mod language;
pub mod retriever;

pub use chunker::Chunker;
pub use diff::diff_chunks;
pub use hash::{content_hash, source_hash};
pub use indexer::Indexer;
pub use language::contains_cjk;
pub use retriever::{Retriever, RetrieveRequest, RetrieveResult};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RagError> for newsflow_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding(msg) | RagError::Search(msg) => {
                newsflow_core::Error::Retrieve(msg)
            }
            RagError::Index(msg) => newsflow_core::Error::Index(msg),
            RagError::NotFound(msg) => newsflow_core::Error::NotFound(msg),
        }
    }
}
