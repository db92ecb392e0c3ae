//! Envelope validator
//!
//! Accepts what the model actually produces: strict JSON when possible, a
//! small set of closing-token repairs for truncated output, and as a last
//! resort an answer-only extraction that scans the `"answer"` value by
//! hand. Citations pointing outside the retrieval set are dropped
//! silently; a blank answer without the fallback flag is invalid.

use std::collections::HashMap;

use newsflow_core::SearchResult;

use crate::envelope::LlmAnswer;
use crate::AnswerError;

/// Reason recorded when only the answer text could be recovered
pub const RECOVERED_REASON: &str = "recovered_from_truncated_json";

/// Closing-token repairs tried in order against truncated envelopes
const REPAIR_SUFFIXES: [&str; 4] = ["}", "]}", "\"}", "\"]}"];

/// Validate one raw model response against the retrieved contexts
pub fn validate(
    raw: &str,
    contexts: &HashMap<String, SearchResult>,
) -> Result<LlmAnswer, AnswerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnswerError::Invalid("empty response".to_string()));
    }

    let mut envelope = parse_with_repair(trimmed)
        .or_else(|| extract_answer_only(trimmed))
        .ok_or_else(|| AnswerError::Invalid("response is not a JSON answer".to_string()))?;

    envelope.answer = convert_literal_newlines(envelope.answer.trim());
    envelope
        .citations
        .retain(|c| !c.chunk_id.is_empty() && contexts.contains_key(&c.chunk_id));

    if envelope.answer.is_empty() && !envelope.fallback {
        return Err(AnswerError::Invalid(
            "blank answer without fallback flag".to_string(),
        ));
    }

    Ok(envelope)
}

fn parse_with_repair(raw: &str) -> Option<LlmAnswer> {
    if let Ok(envelope) = serde_json::from_str(raw) {
        return Some(envelope);
    }
    for suffix in REPAIR_SUFFIXES {
        if let Ok(envelope) = serde_json::from_str::<LlmAnswer>(&format!("{raw}{suffix}")) {
            tracing::debug!(suffix, "answer envelope repaired");
            return Some(envelope);
        }
    }
    None
}

/// Scan the `"answer"` value by hand, unescaping `\n \r \t \" \\`.
/// Truncation is accepted; the partial text is the answer.
fn extract_answer_only(raw: &str) -> Option<LlmAnswer> {
    let key_pos = raw.find("\"answer\"")?;
    let rest = &raw[key_pos + "\"answer\"".len()..];

    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] != b':' {
        return None;
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] != b'"' {
        return None;
    }

    let mut answer = String::new();
    let mut escaped = false;
    for c in rest[i + 1..].chars() {
        if escaped {
            match c {
                'n' => answer.push('\n'),
                'r' => answer.push('\r'),
                't' => answer.push('\t'),
                '"' => answer.push('"'),
                '\\' => answer.push('\\'),
                other => {
                    answer.push('\\');
                    answer.push(other);
                }
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            break;
        } else {
            answer.push(c);
        }
    }

    tracing::debug!("answer recovered from truncated JSON");
    Some(LlmAnswer {
        answer,
        citations: Vec::new(),
        fallback: false,
        reason: RECOVERED_REASON.to_string(),
    })
}

/// Models occasionally double-escape newlines; convert literal `\n`
/// sequences to real newlines. `\t` and `\r` are left alone (filesystem
/// paths false-positive).
fn convert_literal_newlines(answer: &str) -> String {
    answer.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contexts(ids: &[&str]) -> HashMap<String, SearchResult> {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    SearchResult {
                        chunk_id: id.to_string(),
                        content: "content".to_string(),
                        score: 1.0,
                        url: "https://news.example.com".to_string(),
                        title: "title".to_string(),
                        version_id: "v-1".to_string(),
                        article_id: "a-1".to_string(),
                        published_at: Some(Utc::now()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_valid_envelope_roundtrip() {
        let raw = r#"{"answer": "  BOJ held rates.  ", "citations": [{"chunk_id": "c1"}, {"chunk_id": "ghost"}], "fallback": false, "reason": ""}"#;
        let envelope = validate(raw, &contexts(&["c1"])).unwrap();
        assert_eq!(envelope.answer, "BOJ held rates.");
        assert_eq!(envelope.citations.len(), 1);
        assert_eq!(envelope.citations[0].chunk_id, "c1");
        assert!(!envelope.fallback);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(validate("   ", &contexts(&[])).is_err());
    }

    #[test]
    fn test_repair_missing_brace() {
        let raw = r#"{"answer": "Hello", "fallback": false, "reason": """#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "Hello");
    }

    #[test]
    fn test_repair_open_citation_array() {
        let raw = r#"{"answer": "Hello", "citations": ["#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "Hello");
        assert!(envelope.citations.is_empty());
    }

    #[test]
    fn test_truncated_answer_extraction() {
        let raw = r#"{"answer": "Hello"#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "Hello");
        assert_eq!(envelope.reason, RECOVERED_REASON);
    }

    #[test]
    fn test_extraction_unescapes() {
        let raw = r#"{"answer": "line1\nline2 \"quoted\" tab\tend"#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "line1\nline2 \"quoted\" tab\tend");
    }

    #[test]
    fn test_literal_newline_conversion() {
        let raw = r#"{"answer": "first\\nsecond", "fallback": false, "reason": ""}"#;
        // After JSON decoding the answer holds a literal backslash-n
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "first\nsecond");
    }

    #[test]
    fn test_literal_tab_not_converted() {
        let raw = r#"{"answer": "path C:\\temp", "fallback": false, "reason": ""}"#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert_eq!(envelope.answer, "path C:\\temp");
    }

    #[test]
    fn test_blank_answer_without_fallback_rejected() {
        let raw = r#"{"answer": "", "fallback": false, "reason": ""}"#;
        assert!(validate(raw, &contexts(&[])).is_err());
    }

    #[test]
    fn test_blank_answer_with_fallback_accepted() {
        let raw = r#"{"answer": "", "fallback": true, "reason": "no grounded answer"}"#;
        let envelope = validate(raw, &contexts(&[])).unwrap();
        assert!(envelope.fallback);
        assert_eq!(envelope.reason, "no grounded answer");
    }

    #[test]
    fn test_citation_with_empty_chunk_id_dropped() {
        let raw = r#"{"answer": "ok", "citations": [{"chunk_id": ""}], "fallback": false, "reason": ""}"#;
        let envelope = validate(raw, &contexts(&["c1"])).unwrap();
        assert!(envelope.citations.is_empty());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate("not json at all", &contexts(&[])).is_err());
    }
}
