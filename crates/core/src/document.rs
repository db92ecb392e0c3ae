//! RAG document versioning types
//!
//! One `RagDocument` per source article. Each content change produces a new
//! `RagDocumentVersion` with strictly increasing `version_number`; chunks
//! belong to a version, and every diff pass appends one `RagChunkEvent` per
//! chunk position. Deletion is a tombstone version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chunker/embedder tag used on tombstone versions
pub const TOMBSTONE_TAG: &str = "tombstone";

/// One logical document per source article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagDocument {
    /// Document ID
    pub id: String,
    /// Source article
    pub article_id: String,
    /// Latest version pointer; the only mutated field
    pub current_version_id: Option<String>,
}

/// Immutable snapshot of a document at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagDocumentVersion {
    /// Version ID
    pub id: String,
    /// Owning document
    pub document_id: String,
    /// Strictly increasing per document, starts at 1
    pub version_number: u32,
    /// Title at this version
    pub title: String,
    /// URL at this version
    pub url: String,
    /// Hash of `title ∥ body`; empty for tombstones
    pub source_hash: String,
    /// Chunker identifier that produced this version's chunks
    pub chunker_version: String,
    /// Embedder identifier used for this version's chunks
    pub embedder_version: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RagDocumentVersion {
    /// A tombstone denotes deletion of the whole document
    pub fn is_tombstone(&self) -> bool {
        self.source_hash.is_empty()
            && self.chunker_version == TOMBSTONE_TAG
            && self.embedder_version == TOMBSTONE_TAG
    }
}

/// Unit of retrieval
///
/// Invariant: `(version_id, ordinal)` unique and contiguous from 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagChunk {
    /// Chunk ID
    pub id: String,
    /// Owning version
    pub version_id: String,
    /// 0-based position within the version
    pub ordinal: u32,
    /// Chunk text
    pub content: String,
    /// Dense embedding
    pub embedding: Vec<f32>,
}

/// Diff event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkEventType {
    Added,
    Updated,
    Unchanged,
    Deleted,
}

/// Append-only diff record, one per chunk position processed by a diff pass
///
/// For `deleted` events `chunk_id` refers to the old (previous-version)
/// chunk; it is a back-reference, not an ownership edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagChunkEvent {
    /// Version the diff pass produced
    pub version_id: String,
    /// Affected chunk, when one exists
    pub chunk_id: Option<String>,
    /// Position the event describes
    pub ordinal: u32,
    /// What happened at this position
    pub event_type: ChunkEventType,
}

/// One ANN search hit, joined with version/article metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched chunk
    pub chunk_id: String,
    /// Chunk text
    pub content: String,
    /// Similarity score (higher is better)
    pub score: f32,
    /// Article URL
    pub url: String,
    /// Article title
    pub title: String,
    /// Version the chunk belongs to
    pub version_id: String,
    /// Source article
    pub article_id: String,
    /// Article publication time, when known (drives temporal boosting)
    pub published_at: Option<DateTime<Utc>>,
}
