//! Idempotent article indexer
//!
//! Upserts run in a single transaction: compute the source hash, short-
//! circuit when nothing changed, otherwise chunk, embed, insert the next
//! version with its chunks and diff events, and advance the current
//! version pointer. Deletes append a tombstone version with one `deleted`
//! event per previous chunk.

use std::sync::Arc;

use newsflow_core::clock::SharedClock;
use newsflow_core::{
    RagChunk, RagChunkRepository, RagDocument, RagDocumentRepository, RagDocumentVersion,
    Result, TransactionManager, VectorEncoder, TOMBSTONE_TAG,
};

use crate::chunker::Chunker;
use crate::diff::{added_events, deleted_events, diff_chunks};
use crate::hash::source_hash;
use crate::RagError;

pub struct Indexer {
    documents: Arc<dyn RagDocumentRepository>,
    chunks: Arc<dyn RagChunkRepository>,
    tx: Arc<dyn TransactionManager>,
    encoder: Arc<dyn VectorEncoder>,
    chunker: Chunker,
    clock: SharedClock,
}

impl Indexer {
    pub fn new(
        documents: Arc<dyn RagDocumentRepository>,
        chunks: Arc<dyn RagChunkRepository>,
        tx: Arc<dyn TransactionManager>,
        encoder: Arc<dyn VectorEncoder>,
        chunker: Chunker,
        clock: SharedClock,
    ) -> Self {
        Self {
            documents,
            chunks,
            tx,
            encoder,
            chunker,
            clock,
        }
    }

    /// Index or re-index one finalized article
    pub async fn upsert(
        &self,
        article_id: &str,
        title: &str,
        url: &str,
        body: &str,
    ) -> Result<()> {
        let documents = self.documents.clone();
        let chunk_repo = self.chunks.clone();
        let encoder = self.encoder.clone();
        let chunker = self.chunker.clone();
        let clock = self.clock.clone();
        let article_id = article_id.to_string();
        let title = title.to_string();
        let url = url.to_string();
        let body = body.to_string();

        self.tx
            .run_in_tx(Box::pin(async move {
                let hash = source_hash(&title, &body);

                let (document, prev) = match documents.get_by_article_id(&article_id).await? {
                    Some(document) => {
                        let prev = documents.get_latest_version(&document.id).await?;
                        (document, prev)
                    }
                    None => {
                        let document = RagDocument {
                            id: uuid::Uuid::new_v4().to_string(),
                            article_id: article_id.clone(),
                            current_version_id: None,
                        };
                        documents.create_document(&document).await?;
                        (document, None)
                    }
                };

                if let Some(prev) = &prev {
                    if !prev.is_tombstone()
                        && prev.source_hash == hash
                        && prev.url == url
                        && prev.title == title
                    {
                        tracing::debug!(article_id = %article_id, "content unchanged, skipping");
                        return Ok(());
                    }
                }

                let pieces = chunker.chunk(&body);
                let embeddings = encoder.encode(&pieces).await?;
                if embeddings.len() != pieces.len() {
                    return Err(RagError::Embedding(format!(
                        "encoder returned {} embeddings for {} chunks",
                        embeddings.len(),
                        pieces.len()
                    ))
                    .into());
                }

                let version = RagDocumentVersion {
                    id: uuid::Uuid::new_v4().to_string(),
                    document_id: document.id.clone(),
                    version_number: prev.as_ref().map(|v| v.version_number + 1).unwrap_or(1),
                    title,
                    url,
                    source_hash: hash,
                    chunker_version: chunker.version().to_string(),
                    embedder_version: encoder.version().to_string(),
                    created_at: clock.now(),
                };
                documents.create_version(&version).await?;

                let new_chunks: Vec<RagChunk> = pieces
                    .into_iter()
                    .zip(embeddings)
                    .enumerate()
                    .map(|(ordinal, (content, embedding))| RagChunk {
                        id: uuid::Uuid::new_v4().to_string(),
                        version_id: version.id.clone(),
                        ordinal: ordinal as u32,
                        content,
                        embedding,
                    })
                    .collect();
                chunk_repo.bulk_insert_chunks(&new_chunks).await?;

                let events = match &prev {
                    Some(prev) if !prev.is_tombstone() => {
                        let old_chunks = chunk_repo.get_chunks_by_version_id(&prev.id).await?;
                        diff_chunks(&version.id, &old_chunks, &new_chunks)
                    }
                    _ => added_events(&version.id, &new_chunks),
                };
                chunk_repo.insert_events(&events).await?;

                documents
                    .update_current_version(&document.id, &version.id)
                    .await?;

                tracing::info!(
                    article_id = %article_id,
                    version = version.version_number,
                    chunks = new_chunks.len(),
                    events = events.len(),
                    "article indexed"
                );
                Ok(())
            }))
            .await
    }

    /// Tombstone one article's document
    pub async fn delete(&self, article_id: &str) -> Result<()> {
        let documents = self.documents.clone();
        let chunk_repo = self.chunks.clone();
        let clock = self.clock.clone();
        let article_id = article_id.to_string();

        self.tx
            .run_in_tx(Box::pin(async move {
                let Some(document) = documents.get_by_article_id(&article_id).await? else {
                    return Ok(());
                };
                let Some(prev) = documents.get_latest_version(&document.id).await? else {
                    return Ok(());
                };
                if prev.is_tombstone() {
                    // Repeated delete
                    return Ok(());
                }

                let tombstone = RagDocumentVersion {
                    id: uuid::Uuid::new_v4().to_string(),
                    document_id: document.id.clone(),
                    version_number: prev.version_number + 1,
                    title: prev.title.clone(),
                    url: prev.url.clone(),
                    source_hash: String::new(),
                    chunker_version: TOMBSTONE_TAG.to_string(),
                    embedder_version: TOMBSTONE_TAG.to_string(),
                    created_at: clock.now(),
                };
                documents.create_version(&tombstone).await?;

                let old_chunks = chunk_repo.get_chunks_by_version_id(&prev.id).await?;
                chunk_repo
                    .insert_events(&deleted_events(&tombstone.id, &old_chunks))
                    .await?;

                documents
                    .update_current_version(&document.id, &tombstone.id)
                    .await?;

                tracing::info!(article_id = %article_id, "article tombstoned");
                Ok(())
            }))
            .await
    }
}
