//! Prompt assembly
//!
//! Builds the system and user messages for the single answer-generation
//! call. Contexts are rendered as XML-ish blocks the model can cite by
//! chunk id; the system prompt pins the strict JSON envelope.

use newsflow_core::{ChatRequest, Message, SearchResult};

const SYSTEM_PROMPT: &str = r#"You are a news assistant. Answer the user's question using ONLY the provided context passages.

Rules:
- Cite the passages you used by their chunk id.
- If the contexts do not contain a grounded answer, set "fallback" to true and explain why in "reason".
- Respond with exactly one JSON object, no surrounding text or code fences:
{"answer": "...", "citations": [{"chunk_id": "...", "reason": "..."}], "fallback": false, "reason": ""}"#;

/// Build the chat request for one answer generation
pub fn build_chat_request(
    query: &str,
    contexts: &[SearchResult],
    locale: &str,
    max_tokens: u32,
) -> ChatRequest {
    let mut user = String::from("<contexts>\n");
    for context in contexts {
        user.push_str(&format!(
            "<context chunk_id=\"{}\" title=\"{}\" url=\"{}\">\n{}\n</context>\n",
            context.chunk_id,
            escape_attr(&context.title),
            escape_attr(&context.url),
            context.content
        ));
    }
    user.push_str("</contexts>\n\n");
    user.push_str(&format!("Answer in locale \"{locale}\".\n\nQuestion: {query}"));

    ChatRequest {
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
        max_tokens: Some(max_tokens),
        temperature: None,
        model: None,
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}
