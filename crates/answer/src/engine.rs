//! Answer engine
//!
//! `execute` is the blocking operation: retrieve, prompt, one LLM chat
//! call, validate, hydrate citations. `stream` runs the same pipeline as
//! a producer task writing to a bounded event channel, emitting answer
//! deltas while the model is still streaming and heartbeats whenever the
//! pipeline is waiting on slow work.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[cfg(test)]
use newsflow_core::Error;
use newsflow_core::{CancelToken, LlmClient, Result, SearchResult};
use newsflow_config::AnswerConfig;
use newsflow_rag::{RetrieveRequest, Retriever};

use crate::cache::AnswerCache;
use crate::envelope::{AnswerOutput, Citation, FallbackCategory, LlmAnswer};
use crate::partial::PartialAnswerParser;
use crate::prompt::build_chat_request;
use crate::stream::AnswerEvent;
use crate::validator::validate;
use crate::AnswerError;

/// Answer request
#[derive(Debug, Clone, Default)]
pub struct AnswerRequest {
    pub query: String,
    pub candidate_article_ids: Option<Vec<String>>,
    pub max_chunks: Option<usize>,
    pub max_tokens: Option<u32>,
    pub locale: Option<String>,
}

impl AnswerRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Retrieval outcome plus the assembled prompt
struct Prepared {
    contexts: Vec<SearchResult>,
    context_map: HashMap<String, SearchResult>,
    chat_request: newsflow_core::ChatRequest,
    debug: serde_json::Value,
}

pub struct AnswerEngine {
    retriever: Arc<Retriever>,
    llm: Arc<dyn LlmClient>,
    cache: AnswerCache,
    config: AnswerConfig,
}

impl AnswerEngine {
    pub fn new(
        retriever: Arc<Retriever>,
        llm: Arc<dyn LlmClient>,
        cache: AnswerCache,
        config: AnswerConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            cache,
            config,
        }
    }

    /// Blocking operation: returns the full validated output
    pub async fn execute(&self, request: &AnswerRequest) -> Result<AnswerOutput> {
        self.execute_inner(request, false, true).await
    }

    /// Morning-digest variant: recency-boosted retrieval, no caching
    pub async fn execute_digest(&self, request: &AnswerRequest) -> Result<AnswerOutput> {
        self.execute_inner(request, true, false).await
    }

    async fn execute_inner(
        &self,
        request: &AnswerRequest,
        recent: bool,
        use_cache: bool,
    ) -> Result<AnswerOutput> {
        if request.query.trim().is_empty() {
            return Err(AnswerError::EmptyQuery.into());
        }

        let key = self.cache_key(request);
        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(query = %request.query, "answer cache hit");
                return Ok(hit);
            }
        }

        let prepared = self.prepare(request, recent).await?;
        if prepared.contexts.is_empty() {
            return Ok(AnswerOutput::fallback(
                FallbackCategory::RetrievalEmpty,
                Vec::new(),
            ));
        }

        let response = match self.llm.chat(prepared.chat_request.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "answer generation failed");
                return Ok(AnswerOutput::fallback(
                    FallbackCategory::GenerationFailed,
                    prepared.contexts,
                ));
            }
        };
        if response.text.trim().is_empty() || !response.done {
            return Ok(AnswerOutput::fallback(
                FallbackCategory::GenerationFailed,
                prepared.contexts,
            ));
        }

        let output = self.finish(&response.text, prepared);
        if use_cache && !output.fallback {
            self.cache.insert(key, output.clone());
        }
        Ok(output)
    }

    /// Event-channel operation
    pub fn stream(
        self: &Arc<Self>,
        request: AnswerRequest,
        cancel: CancelToken,
    ) -> mpsc::Receiver<AnswerEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_stream(request, cancel, tx).await;
        });
        rx
    }

    async fn run_stream(
        &self,
        request: AnswerRequest,
        cancel: CancelToken,
        tx: mpsc::Sender<AnswerEvent>,
    ) {
        // First byte out before any slow work, so the transport starts
        // flushing immediately.
        if !emit(&tx, AnswerEvent::Thinking(String::new())).await {
            return;
        }

        if request.query.trim().is_empty() {
            emit(&tx, AnswerEvent::Error("query must not be empty".to_string())).await;
            return;
        }

        let key = self.cache_key(&request);
        if let Some(hit) = self.cache.get(&key) {
            emit(
                &tx,
                AnswerEvent::Meta {
                    contexts: hit.contexts.clone(),
                    debug: serde_json::json!({"cache": "hit"}),
                },
            )
            .await;
            emit(&tx, AnswerEvent::Delta(hit.answer.clone())).await;
            emit(&tx, AnswerEvent::Done(hit)).await;
            return;
        }

        if !emit(&tx, AnswerEvent::Progress("searching".to_string())).await {
            return;
        }

        let heartbeat = self.config.heartbeat_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);

        let prepare = self.prepare(&request, false);
        tokio::pin!(prepare);
        let prepared = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    emit(&tx, AnswerEvent::Error("client disconnected".to_string())).await;
                    return;
                }
                _ = ticker.tick() => {
                    if !emit(&tx, AnswerEvent::Heartbeat).await {
                        return;
                    }
                }
                result = &mut prepare => break result,
            }
        };
        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                emit(&tx, AnswerEvent::Error(e.to_string())).await;
                return;
            }
        };

        if !emit(&tx, AnswerEvent::Progress("generating".to_string())).await {
            return;
        }
        if !emit(
            &tx,
            AnswerEvent::Meta {
                contexts: prepared.contexts.clone(),
                debug: prepared.debug.clone(),
            },
        )
        .await
        {
            return;
        }

        if prepared.contexts.is_empty() {
            emit(
                &tx,
                AnswerEvent::Fallback(FallbackCategory::RetrievalEmpty.as_str().to_string()),
            )
            .await;
            return;
        }

        let mut chunks = self.llm.chat_stream(prepared.chat_request.clone());
        let mut parser = PartialAnswerParser::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    emit(&tx, AnswerEvent::Error("client disconnected".to_string())).await;
                    return;
                }
                _ = ticker.tick() => {
                    if !emit(&tx, AnswerEvent::Heartbeat).await {
                        return;
                    }
                }
                chunk = chunks.next() => match chunk {
                    Some(Ok(chunk)) => {
                        if !chunk.thinking.is_empty()
                            && !emit(&tx, AnswerEvent::Thinking(chunk.thinking)).await
                        {
                            return;
                        }
                        if !chunk.response.is_empty() {
                            let delta = parser.feed(&chunk.response);
                            if !delta.is_empty() && !emit(&tx, AnswerEvent::Delta(delta)).await {
                                return;
                            }
                        }
                        if chunk.done {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "chat stream failed");
                        emit(
                            &tx,
                            AnswerEvent::Fallback(
                                FallbackCategory::GenerationFailed.as_str().to_string(),
                            ),
                        )
                        .await;
                        return;
                    }
                    None => break,
                }
            }
        }

        if parser.raw().trim().is_empty() {
            emit(
                &tx,
                AnswerEvent::Fallback(FallbackCategory::GenerationFailed.as_str().to_string()),
            )
            .await;
            return;
        }

        let raw = parser.raw().to_string();
        let output = self.finish(&raw, prepared);
        if output.fallback {
            emit(&tx, AnswerEvent::Fallback(output.reason)).await;
        } else {
            self.cache.insert(key, output.clone());
            emit(&tx, AnswerEvent::Done(output)).await;
        }
    }

    async fn prepare(&self, request: &AnswerRequest, recent: bool) -> Result<Prepared> {
        let mut retrieve = RetrieveRequest::new(request.query.clone());
        if let Some(ids) = &request.candidate_article_ids {
            retrieve = retrieve.within_articles(ids.clone());
        }

        let result = if recent {
            self.retriever.retrieve_recent(&retrieve).await?
        } else {
            self.retriever.retrieve(&retrieve).await?
        };

        let max_chunks = request.max_chunks.unwrap_or(self.config.max_chunks);
        let mut contexts = result.contexts;
        contexts.truncate(max_chunks);

        let context_map: HashMap<String, SearchResult> = contexts
            .iter()
            .map(|c| (c.chunk_id.clone(), c.clone()))
            .collect();

        let locale = request
            .locale
            .clone()
            .unwrap_or_else(|| self.config.locale.clone());
        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);
        let chat_request = build_chat_request(&request.query, &contexts, &locale, max_tokens);

        let debug = serde_json::json!({
            "expanded_queries": result.expanded_queries,
            "context_count": contexts.len(),
        });

        Ok(Prepared {
            contexts,
            context_map,
            chat_request,
            debug,
        })
    }

    /// Validate the raw response and build the caller-facing output
    fn finish(&self, raw: &str, prepared: Prepared) -> AnswerOutput {
        match validate(raw, &prepared.context_map) {
            Ok(envelope) if envelope.fallback => {
                let reason = if envelope.reason.is_empty() {
                    FallbackCategory::LlmFallback.as_str().to_string()
                } else {
                    envelope.reason
                };
                AnswerOutput {
                    answer: envelope.answer,
                    citations: Vec::new(),
                    contexts: prepared.contexts,
                    fallback: true,
                    reason,
                    fallback_category: Some(FallbackCategory::LlmFallback),
                }
            }
            Ok(envelope) => {
                let citations = hydrate_citations(&envelope, &prepared.context_map);
                AnswerOutput {
                    answer: envelope.answer,
                    citations,
                    contexts: prepared.contexts,
                    fallback: false,
                    reason: envelope.reason,
                    fallback_category: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "answer validation failed");
                AnswerOutput::fallback(FallbackCategory::ValidationFailed, prepared.contexts)
            }
        }
    }

    fn cache_key(&self, request: &AnswerRequest) -> String {
        AnswerCache::key(
            &request.query,
            request.candidate_article_ids.as_deref(),
            request.locale.as_deref().unwrap_or(&self.config.locale),
            request.max_chunks.unwrap_or(self.config.max_chunks),
            request.max_tokens.unwrap_or(self.config.max_tokens),
        )
    }
}

fn hydrate_citations(
    envelope: &LlmAnswer,
    context_map: &HashMap<String, SearchResult>,
) -> Vec<Citation> {
    envelope
        .citations
        .iter()
        .filter_map(|raw| {
            context_map.get(&raw.chunk_id).map(|context| Citation {
                chunk_id: raw.chunk_id.clone(),
                article_id: context.article_id.clone(),
                url: context.url.clone(),
                title: context.title.clone(),
                reason: raw.reason.clone(),
            })
        })
        .collect()
}

async fn emit(tx: &mpsc::Sender<AnswerEvent>, event: AnswerEvent) -> bool {
    tx.send(event).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use newsflow_core::{
        cancel_pair, ChatChunk, ChatRequest, ChatStream, GenerateRequest, GenerateResponse,
        RagChunkRepository, SystemClock, VectorEncoder,
    };
    use newsflow_config::RetrieverConfig;
    use std::time::Duration;

    struct OneVectorEncoder;

    #[async_trait]
    impl VectorEncoder for OneVectorEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0]).collect())
        }

        fn version(&self) -> &str {
            "embed-v1"
        }
    }

    struct FixedChunks {
        hits: Vec<SearchResult>,
    }

    #[async_trait]
    impl RagChunkRepository for FixedChunks {
        async fn bulk_insert_chunks(&self, _chunks: &[newsflow_core::RagChunk]) -> Result<()> {
            Ok(())
        }

        async fn get_chunks_by_version_id(
            &self,
            _version_id: &str,
        ) -> Result<Vec<newsflow_core::RagChunk>> {
            Ok(Vec::new())
        }

        async fn insert_events(&self, _events: &[newsflow_core::RagChunkEvent]) -> Result<()> {
            Ok(())
        }

        async fn search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<SearchResult>> {
            Ok(self.hits.clone())
        }

        async fn search_within_articles(
            &self,
            _vector: &[f32],
            _article_ids: &[String],
            _limit: usize,
        ) -> Result<Vec<SearchResult>> {
            Ok(self.hits.clone())
        }
    }

    /// LLM scripted with chat text and stream fragments
    struct ScriptedLlm {
        chat_text: Option<String>,
        fragments: Vec<String>,
        signal_done: bool,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            self.chat(ChatRequest::new("s")).await
        }

        fn generate_stream(&self, _request: GenerateRequest) -> ChatStream {
            Box::pin(futures::stream::empty())
        }

        async fn chat(&self, _request: ChatRequest) -> Result<GenerateResponse> {
            match &self.chat_text {
                Some(text) => Ok(GenerateResponse {
                    text: text.clone(),
                    done: true,
                }),
                None => Err(Error::Llm("backend down".into())),
            }
        }

        fn chat_stream(&self, _request: ChatRequest) -> ChatStream {
            let mut chunks: Vec<Result<ChatChunk>> = self
                .fragments
                .iter()
                .map(|fragment| {
                    Ok(ChatChunk {
                        response: fragment.clone(),
                        ..Default::default()
                    })
                })
                .collect();
            if self.signal_done {
                chunks.push(Ok(ChatChunk {
                    done: true,
                    ..Default::default()
                }));
            }
            Box::pin(futures::stream::iter(chunks))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn context(chunk_id: &str) -> SearchResult {
        SearchResult {
            chunk_id: chunk_id.to_string(),
            content: "The bank held rates.".to_string(),
            score: 0.9,
            url: "https://news.example.com/a".to_string(),
            title: "Rates held".to_string(),
            version_id: "v-1".to_string(),
            article_id: "a-1".to_string(),
            published_at: Some(Utc::now()),
        }
    }

    fn engine(hits: Vec<SearchResult>, llm: ScriptedLlm) -> Arc<AnswerEngine> {
        let retriever = Retriever::new(
            Arc::new(FixedChunks { hits }),
            Arc::new(OneVectorEncoder),
            RetrieverConfig::default(),
            Arc::new(SystemClock),
        );
        Arc::new(AnswerEngine::new(
            Arc::new(retriever),
            Arc::new(llm),
            AnswerCache::new(Duration::from_secs(600), 16, Arc::new(SystemClock)),
            AnswerConfig::default(),
        ))
    }

    async fn collect(mut rx: mpsc::Receiver<AnswerEvent>) -> Vec<AnswerEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_execute_happy_path() {
        let llm = ScriptedLlm {
            chat_text: Some(
                r#"{"answer": "Rates were held.", "citations": [{"chunk_id": "c1"}], "fallback": false, "reason": ""}"#
                    .to_string(),
            ),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);

        let output = engine.execute(&AnswerRequest::new("what happened")).await.unwrap();
        assert!(!output.fallback);
        assert_eq!(output.answer, "Rates were held.");
        assert_eq!(output.citations.len(), 1);
        assert_eq!(output.citations[0].url, "https://news.example.com/a");
    }

    #[tokio::test]
    async fn test_execute_rejects_empty_query() {
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: Vec::new(),
            signal_done: false,
        };
        let engine = engine(Vec::new(), llm);
        let err = engine.execute(&AnswerRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_execute_retrieval_empty_fallback() {
        let llm = ScriptedLlm {
            chat_text: Some("unused".to_string()),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(Vec::new(), llm);
        let output = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        assert!(output.fallback);
        assert_eq!(output.reason, "retrieval_empty");
    }

    #[tokio::test]
    async fn test_execute_generation_failure_fallback() {
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: Vec::new(),
            signal_done: false,
        };
        let engine = engine(vec![context("c1")], llm);
        let output = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        assert!(output.fallback);
        assert_eq!(output.reason, "generation_failed");
        // Contexts preserved on fallback
        assert_eq!(output.contexts.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_model_signalled_fallback() {
        let llm = ScriptedLlm {
            chat_text: Some(
                r#"{"answer": "", "citations": [], "fallback": true, "reason": "not in contexts"}"#
                    .to_string(),
            ),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);
        let output = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        assert!(output.fallback);
        assert_eq!(output.fallback_category, Some(FallbackCategory::LlmFallback));
        assert_eq!(output.reason, "not in contexts");
    }

    #[tokio::test]
    async fn test_execute_validation_failure_fallback() {
        let llm = ScriptedLlm {
            chat_text: Some("complete nonsense".to_string()),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);
        let output = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        assert!(output.fallback);
        assert_eq!(output.reason, "validation_failed");
    }

    #[tokio::test]
    async fn test_stream_truncated_json_recovery() {
        // Seed scenario: {"answer": "Hel + lo" then the stream closes
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: vec![r#"{"answer": "Hel"#.to_string(), r#"lo""#.to_string()],
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);
        let (_handle, cancel) = cancel_pair();

        let events = collect(engine.stream(AnswerRequest::new("query"), cancel)).await;

        let deltas: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                AnswerEvent::Delta(d) => Some(d.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec!["Hel", "lo"]);

        let done = events
            .iter()
            .find_map(|e| match e {
                AnswerEvent::Done(output) => Some(output.clone()),
                _ => None,
            })
            .expect("stream must end with done");
        assert_eq!(done.answer, "Hello");
        assert_eq!(done.reason, "recovered_from_truncated_json");
    }

    #[tokio::test]
    async fn test_stream_ordering_contract() {
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: vec![
                r#"{"answer": "Hi", "citations": [], "fallback": false, "reason": ""}"#
                    .to_string(),
            ],
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);
        let (_handle, cancel) = cancel_pair();

        let events = collect(engine.stream(AnswerRequest::new("query"), cancel)).await;

        // First event starts the flush
        assert!(matches!(&events[0], AnswerEvent::Thinking(t) if t.is_empty()));

        let meta_count = events
            .iter()
            .filter(|e| matches!(e, AnswerEvent::Meta { .. }))
            .count();
        assert_eq!(meta_count, 1);

        let terminal_count = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminal_count, 1);
        assert!(events.last().unwrap().is_terminal());

        // meta strictly precedes any delta
        let meta_index = events
            .iter()
            .position(|e| matches!(e, AnswerEvent::Meta { .. }))
            .unwrap();
        let first_delta = events
            .iter()
            .position(|e| matches!(e, AnswerEvent::Delta(_)))
            .unwrap();
        assert!(meta_index < first_delta);

        // searching precedes generating
        let searching = events
            .iter()
            .position(|e| matches!(e, AnswerEvent::Progress(p) if p == "searching"))
            .unwrap();
        let generating = events
            .iter()
            .position(|e| matches!(e, AnswerEvent::Progress(p) if p == "generating"))
            .unwrap();
        assert!(searching < generating);
    }

    #[tokio::test]
    async fn test_stream_retrieval_empty_fallback() {
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: Vec::new(),
            signal_done: false,
        };
        let engine = engine(Vec::new(), llm);
        let (_handle, cancel) = cancel_pair();

        let events = collect(engine.stream(AnswerRequest::new("query"), cancel)).await;
        assert!(matches!(
            events.last().unwrap(),
            AnswerEvent::Fallback(reason) if reason == "retrieval_empty"
        ));
    }

    #[tokio::test]
    async fn test_stream_cancel_emits_client_disconnected() {
        let llm = ScriptedLlm {
            chat_text: None,
            fragments: Vec::new(),
            signal_done: false,
        };
        let engine = engine(vec![context("c1")], llm);
        let (handle, cancel) = cancel_pair();
        handle.cancel();

        let events = collect(engine.stream(AnswerRequest::new("query"), cancel)).await;
        assert!(events
            .iter()
            .any(|e| matches!(e, AnswerEvent::Error(msg) if msg == "client disconnected")));
    }

    #[tokio::test]
    async fn test_stream_cache_hit_short_circuit() {
        let llm = ScriptedLlm {
            chat_text: Some(
                r#"{"answer": "Cached answer.", "citations": [], "fallback": false, "reason": ""}"#
                    .to_string(),
            ),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);

        // Prime the cache through execute
        engine.execute(&AnswerRequest::new("query")).await.unwrap();

        let (_handle, cancel) = cancel_pair();
        let events = collect(engine.stream(AnswerRequest::new("query"), cancel)).await;

        let kinds: Vec<&str> = events.iter().map(AnswerEvent::kind).collect();
        assert_eq!(kinds, vec!["thinking", "meta", "delta", "done"]);
        assert!(matches!(
            &events[2],
            AnswerEvent::Delta(d) if d == "Cached answer."
        ));
    }

    #[tokio::test]
    async fn test_execute_caches_successful_answers() {
        let llm = ScriptedLlm {
            chat_text: Some(
                r#"{"answer": "Hi", "citations": [], "fallback": false, "reason": ""}"#
                    .to_string(),
            ),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);

        let first = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        let second = engine.execute(&AnswerRequest::new("query")).await.unwrap();
        assert_eq!(first.answer, second.answer);
    }

    #[tokio::test]
    async fn test_digest_uses_recent_retrieval() {
        let llm = ScriptedLlm {
            chat_text: Some(
                r#"{"answer": "Digest.", "citations": [], "fallback": false, "reason": ""}"#
                    .to_string(),
            ),
            fragments: Vec::new(),
            signal_done: true,
        };
        let engine = engine(vec![context("c1")], llm);
        let output = engine
            .execute_digest(&AnswerRequest::new("today's topics"))
            .await
            .unwrap();
        assert_eq!(output.answer, "Digest.");
    }
}
