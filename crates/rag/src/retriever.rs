//! Multi-query retriever
//!
//! Expands the user query (dedicated service preferred, LLM prompt as
//! fallback, keyword-search tags appended), embeds all queries in one
//! batch, fans out one ANN search per embedding, then merges: the original
//! query's ranked list fills its quota first, and the expanded lists are
//! fused with Reciprocal Rank Fusion and fill the remaining slots in two
//! passes (non-Japanese titles first). Temporal boosting and cross-encoder
//! reranking are applied last.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use newsflow_core::clock::SharedClock;
use newsflow_core::{
    ChatRequest, Error, LlmClient, QueryExpander, RagChunkRepository, Reranker, Result,
    SearchClient, SearchResult, VectorEncoder,
};
use newsflow_config::RetrieverConfig;

use crate::language::contains_cjk;

/// Keyword-search hits whose tags seed extra queries
const TAG_SOURCE_HITS: usize = 3;

/// Retrieval request
#[derive(Debug, Clone)]
pub struct RetrieveRequest {
    pub query: String,
    /// Restrict the search to these articles when present
    pub candidate_article_ids: Option<Vec<String>>,
}

impl RetrieveRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            candidate_article_ids: None,
        }
    }

    pub fn within_articles(mut self, ids: Vec<String>) -> Self {
        self.candidate_article_ids = Some(ids);
        self
    }
}

/// Retrieval outcome
#[derive(Debug, Clone, Default)]
pub struct RetrieveResult {
    /// Merged contexts, best first; empty when nothing matched
    pub contexts: Vec<SearchResult>,
    /// Queries actually searched, original first
    pub expanded_queries: Vec<String>,
}

pub struct Retriever {
    chunks: Arc<dyn RagChunkRepository>,
    encoder: Arc<dyn VectorEncoder>,
    expander: Option<Arc<dyn QueryExpander>>,
    llm: Option<Arc<dyn LlmClient>>,
    search: Option<Arc<dyn SearchClient>>,
    reranker: Option<Arc<dyn Reranker>>,
    config: RetrieverConfig,
    clock: SharedClock,
}

impl Retriever {
    pub fn new(
        chunks: Arc<dyn RagChunkRepository>,
        encoder: Arc<dyn VectorEncoder>,
        config: RetrieverConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            chunks,
            encoder,
            expander: None,
            llm: None,
            search: None,
            reranker: None,
            config,
            clock,
        }
    }

    /// Use a dedicated query-expansion service
    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Fall back to LLM-prompted expansion when no service is wired
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Seed extra queries from keyword-search tags
    pub fn with_search_client(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Retrieve contexts for a query
    pub async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResult> {
        self.retrieve_inner(request, self.config.temporal_boost).await
    }

    /// Digest variant: recency-boosted retrieval
    pub async fn retrieve_recent(&self, request: &RetrieveRequest) -> Result<RetrieveResult> {
        self.retrieve_inner(request, true).await
    }

    async fn retrieve_inner(
        &self,
        request: &RetrieveRequest,
        temporal_boost: bool,
    ) -> Result<RetrieveResult> {
        let mut queries = vec![request.query.clone()];
        self.expand_queries(&request.query, &mut queries).await;
        self.append_keyword_tags(&request.query, &mut queries).await;

        let embeddings = self.encoder.encode(&queries).await?;
        if embeddings.len() != queries.len() {
            return Err(Error::Retrieve(format!(
                "encoder returned {} embeddings for {} queries",
                embeddings.len(),
                queries.len()
            )));
        }

        let per_query = self.search_all(embeddings, request).await?;

        let mut contexts = self.merge(&per_query);
        if contexts.is_empty() {
            tracing::debug!(query = %request.query, "retrieval found no candidates");
            return Ok(RetrieveResult {
                contexts,
                expanded_queries: queries,
            });
        }

        if temporal_boost {
            self.apply_temporal_boost(&mut contexts);
        }
        contexts = self.maybe_rerank(&request.query, contexts).await;

        Ok(RetrieveResult {
            contexts,
            expanded_queries: queries,
        })
    }

    /// Query expansion is best-effort; failures warn and proceed
    async fn expand_queries(&self, query: &str, queries: &mut Vec<String>) {
        let n = self.config.expansion_count;

        if let Some(expander) = &self.expander {
            match expander.expand_query(query, n, n).await {
                Ok(variants) => push_unique(queries, variants),
                Err(e) => tracing::warn!(error = %e, "query expansion service failed"),
            }
            return;
        }

        let Some(llm) = &self.llm else { return };
        let translations = if contains_cjk(query) {
            " Include English translations of the query."
        } else {
            ""
        };
        let prompt = format!(
            "Rewrite the search query below into 3-5 short English variants that \
             would match relevant news articles. One variant per line, no \
             numbering.{translations}\n\nQuery: {query}"
        );
        let request = ChatRequest::new(
            "You rewrite search queries for a news retrieval system.",
        )
        .with_user_message(prompt)
        .with_max_tokens(256);

        match llm.chat(request).await {
            Ok(response) => {
                let variants: Vec<String> = response
                    .text
                    .lines()
                    .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).to_string())
                    .filter(|line| !line.is_empty())
                    .take(5)
                    .collect();
                push_unique(queries, variants);
            }
            Err(e) => tracing::warn!(error = %e, "LLM query expansion failed"),
        }
    }

    async fn append_keyword_tags(&self, query: &str, queries: &mut Vec<String>) {
        let Some(search) = &self.search else { return };
        match search.search(query).await {
            Ok(hits) => {
                let tags: Vec<String> = hits
                    .iter()
                    .take(TAG_SOURCE_HITS)
                    .flat_map(|hit| hit.tags.iter().cloned())
                    .collect();
                push_unique(queries, tags);
            }
            Err(e) => tracing::warn!(error = %e, "keyword search failed"),
        }
    }

    /// One ANN search per embedding; results funnel through a channel and
    /// are re-ordered by query index.
    async fn search_all(
        &self,
        embeddings: Vec<Vec<f32>>,
        request: &RetrieveRequest,
    ) -> Result<Vec<Vec<SearchResult>>> {
        let count = embeddings.len();
        let (tx, mut rx) = tokio::sync::mpsc::channel(count.max(1));

        for (index, embedding) in embeddings.into_iter().enumerate() {
            let chunks = self.chunks.clone();
            let candidates = request.candidate_article_ids.clone();
            let limit = self.config.search_limit;
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = match candidates {
                    Some(ids) if !ids.is_empty() => {
                        chunks.search_within_articles(&embedding, &ids, limit).await
                    }
                    _ => chunks.search(&embedding, limit).await,
                };
                let _ = tx.send((index, result)).await;
            });
        }
        drop(tx);

        let mut per_query: Vec<Vec<SearchResult>> = (0..count).map(|_| Vec::new()).collect();
        while let Some((index, result)) = rx.recv().await {
            per_query[index] = result?;
        }
        Ok(per_query)
    }

    /// Quota merge: original list first, then RRF-fused expanded lists in
    /// two language passes.
    fn merge(&self, per_query: &[Vec<SearchResult>]) -> Vec<SearchResult> {
        let original = per_query.first().map(Vec::as_slice).unwrap_or(&[]);

        let mut rrf: HashMap<String, (f32, SearchResult)> = HashMap::new();
        for list in per_query.iter().skip(1) {
            for (rank, hit) in list.iter().enumerate() {
                let score = 1.0 / (self.config.rrf_k + (rank + 1) as f32);
                rrf.entry(hit.chunk_id.clone())
                    .and_modify(|(s, _)| *s += score)
                    .or_insert_with(|| (score, hit.clone()));
            }
        }
        let mut fused: Vec<(f32, SearchResult)> = rrf.into_values().collect();
        fused.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for hit in original {
            if selected.len() >= self.config.quota_original {
                break;
            }
            if seen.insert(hit.chunk_id.clone()) {
                selected.push(hit.clone());
            }
        }

        let mut expanded_taken = 0;
        for japanese_pass in [false, true] {
            for (_, hit) in &fused {
                if expanded_taken >= self.config.quota_expanded {
                    break;
                }
                if seen.contains(&hit.chunk_id) {
                    continue;
                }
                if !japanese_pass && contains_cjk(&hit.title) {
                    continue;
                }
                seen.insert(hit.chunk_id.clone());
                selected.push(hit.clone());
                expanded_taken += 1;
            }
        }

        selected
    }

    /// Recency multipliers: 1.30 within 6 h, 1.15 within 12 h, 1.05
    /// within 18 h.
    fn apply_temporal_boost(&self, contexts: &mut Vec<SearchResult>) {
        let now = self.clock.now();
        for hit in contexts.iter_mut() {
            let Some(published_at) = hit.published_at else {
                continue;
            };
            let age_hours = now
                .signed_duration_since(published_at)
                .num_seconds()
                .max(0) as f64
                / 3600.0;
            let factor = if age_hours <= 6.0 {
                1.30
            } else if age_hours <= 12.0 {
                1.15
            } else if age_hours <= 18.0 {
                1.05
            } else {
                1.0
            };
            hit.score *= factor as f32;
        }
        contexts.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Cross-encoder rerank with timeout fall-through
    async fn maybe_rerank(
        &self,
        query: &str,
        contexts: Vec<SearchResult>,
    ) -> Vec<SearchResult> {
        if !self.config.rerank_enabled {
            return contexts;
        }
        let Some(reranker) = &self.reranker else {
            return contexts;
        };

        match tokio::time::timeout(
            self.config.rerank_timeout(),
            reranker.rerank(query, contexts.clone()),
        )
        .await
        {
            Ok(Ok(reranked)) => reranked
                .into_iter()
                .take(self.config.rerank_top_k)
                .collect(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "reranker failed, keeping fused order");
                contexts
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.rerank_timeout_secs,
                    "reranker timed out, keeping fused order"
                );
                contexts
            }
        }
    }
}

fn push_unique(queries: &mut Vec<String>, candidates: Vec<String>) {
    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        if !candidate.is_empty() && !queries.contains(&candidate) {
            queries.push(candidate);
        }
    }
}
