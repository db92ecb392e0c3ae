//! Trait seams consumed by the core
//!
//! Persistence drivers and external model services live behind these
//! contracts; the core never talks to a database or model host directly.

pub mod llm;
pub mod repository;
pub mod services;

pub use llm::{
    ChatChunk, ChatRequest, ChatStream, GenerateRequest, GenerateResponse, LlmClient, Message,
    Role,
};
pub use repository::{
    ArticleRepository, FeedRepository, ProcessingStats, RagChunkRepository,
    RagDocumentRepository, SummarizeJobRepository, SummaryRepository, TransactionManager,
};
pub use services::{
    Priority, QueryExpander, Reranker, SearchClient, SearchHit, SummarizerService,
    SummaryQualityScorer, VectorEncoder,
};
