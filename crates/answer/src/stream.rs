//! Answer stream events
//!
//! The stream contract observed by clients:
//! `thinking(init) ≺ progress("searching") ≺ heartbeats* ≺
//! progress("generating") ≺ meta ≺ (delta|thinking|heartbeat)* ≺
//! (done | fallback)`; `error` may pre-empt anywhere. Exactly one `meta`
//! and exactly one terminal event per stream.

use serde::{Deserialize, Serialize};

use newsflow_core::SearchResult;

use crate::envelope::AnswerOutput;

/// One event on the answer stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// Retrieval outcome and debug data, emitted once before any delta
    Meta {
        contexts: Vec<SearchResult>,
        debug: serde_json::Value,
    },
    /// Model thinking fragment; the initial empty one starts the flush
    Thinking(String),
    /// Stage transition: "searching", "generating"
    Progress(String),
    /// Keep-alive for idle-timeout middleboxes
    Heartbeat,
    /// Decoded answer-text fragment
    Delta(String),
    /// Terminal: validated output
    Done(AnswerOutput),
    /// Terminal: structured non-answer with its reason
    Fallback(String),
    /// Terminal: exceptional failure (e.g. client disconnected)
    Error(String),
}

impl AnswerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnswerEvent::Done(_) | AnswerEvent::Fallback(_) | AnswerEvent::Error(_)
        )
    }

    /// Event kind label for logging and SSE event names
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerEvent::Meta { .. } => "meta",
            AnswerEvent::Thinking(_) => "thinking",
            AnswerEvent::Progress(_) => "progress",
            AnswerEvent::Heartbeat => "heartbeat",
            AnswerEvent::Delta(_) => "delta",
            AnswerEvent::Done(_) => "done",
            AnswerEvent::Fallback(_) => "fallback",
            AnswerEvent::Error(_) => "error",
        }
    }
}
