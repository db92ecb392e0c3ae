//! Core traits and types for the newsflow content pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - The content data model (articles, summaries, summarize jobs)
//! - The RAG data model (documents, versions, chunks, chunk events)
//! - Cursor-based pagination
//! - Cooperative cancellation
//! - Repository and external-service traits
//! - Error types

pub mod article;
pub mod cancel;
pub mod clock;
pub mod cursor;
pub mod document;
pub mod error;
pub mod job;
pub mod traits;

// Re-exports from data-model modules
pub use article::{Article, ArticleSummary, ArticleWithSummary, SummarizedContent};
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use clock::{Clock, SystemClock};
pub use cursor::Cursor;
pub use document::{
    ChunkEventType, RagChunk, RagChunkEvent, RagDocument, RagDocumentVersion, SearchResult,
    TOMBSTONE_TAG,
};
pub use error::{Error, Result, SummarizeError};
pub use job::{JobStatus, SummarizeJob};

// Trait re-exports
pub use traits::{
    // LLM
    ChatChunk, ChatRequest, ChatStream, GenerateRequest, GenerateResponse, LlmClient, Message,
    Role,
    // Repositories
    ArticleRepository, FeedRepository, ProcessingStats, RagChunkRepository,
    RagDocumentRepository, SummarizeJobRepository, SummaryRepository, TransactionManager,
    // External services
    Priority, QueryExpander, Reranker, SearchClient, SearchHit, SummarizerService,
    SummaryQualityScorer, VectorEncoder,
};
