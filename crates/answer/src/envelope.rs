//! Answer envelope types
//!
//! The model is instructed to emit a strict JSON object
//! `{ "answer", "citations", "fallback", "reason" }`; `LlmAnswer` is that
//! envelope after validation, `AnswerOutput` is the caller-facing record
//! with citations hydrated against the retrieved contexts.

use serde::{Deserialize, Serialize};

use newsflow_core::SearchResult;

/// The envelope the model emits
///
/// `answer`, `fallback` and `reason` are required: a structurally complete
/// envelope must carry them, and anything shorter is handled by the
/// validator's repair/extraction path instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmAnswer {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<RawCitation>,
    pub fallback: bool,
    pub reason: String,
}

/// Citation as emitted by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCitation {
    #[serde(default)]
    pub chunk_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Citation hydrated against the retrieval set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub chunk_id: String,
    pub article_id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Why an answer fell back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCategory {
    /// Retrieval produced no contexts
    RetrievalEmpty,
    /// The LLM call failed, returned nothing, or did not finish
    GenerationFailed,
    /// The envelope stayed invalid after repair and extraction
    ValidationFailed,
    /// The model itself signalled `fallback = true`
    LlmFallback,
}

impl FallbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackCategory::RetrievalEmpty => "retrieval_empty",
            FallbackCategory::GenerationFailed => "generation_failed",
            FallbackCategory::ValidationFailed => "validation_failed",
            FallbackCategory::LlmFallback => "llm_fallback",
        }
    }
}

/// Final answer record returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// Contexts are preserved even on fallback
    pub contexts: Vec<SearchResult>,
    pub fallback: bool,
    /// Model reason, validator reason, or the fallback category
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_category: Option<FallbackCategory>,
}

impl AnswerOutput {
    /// A structured fallback outcome
    pub fn fallback(category: FallbackCategory, contexts: Vec<SearchResult>) -> Self {
        Self {
            answer: String::new(),
            citations: Vec::new(),
            contexts,
            fallback: true,
            reason: category.as_str().to_string(),
            fallback_category: Some(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_envelope_parses() {
        let envelope: LlmAnswer = serde_json::from_str(
            r#"{"answer": "hi", "citations": [], "fallback": false, "reason": ""}"#,
        )
        .unwrap();
        assert_eq!(envelope.answer, "hi");
        assert!(!envelope.fallback);
        assert!(envelope.citations.is_empty());
    }

    #[test]
    fn test_partial_envelope_is_rejected_by_strict_parse() {
        assert!(serde_json::from_str::<LlmAnswer>(r#"{"answer": "hi"}"#).is_err());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(FallbackCategory::RetrievalEmpty.as_str(), "retrieval_empty");
        assert_eq!(FallbackCategory::LlmFallback.as_str(), "llm_fallback");
    }

    #[test]
    fn test_fallback_output_preserves_contexts() {
        let output = AnswerOutput::fallback(FallbackCategory::GenerationFailed, Vec::new());
        assert!(output.fallback);
        assert_eq!(output.reason, "generation_failed");
        assert!(output.answer.is_empty());
    }
}
