//! HTML to plain-text extraction
//!
//! Article content occasionally arrives with markup the upstream sanitizer
//! missed. The worker detects that cheaply and strips tags before
//! summarizing; if stripping leaves nothing, the raw content is used.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cheap heuristic: any `<` and any `>` present
pub fn looks_like_html(content: &str) -> bool {
    content.contains('<') && content.contains('>')
}

/// Strip tags and decode the entities that matter for news text
pub fn extract_text(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_blocks, "\n");

    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let trimmed_lines: Vec<&str> = decoded
        .lines()
        .map(str::trim)
        .collect();
    let joined = trimmed_lines.join("\n");
    BLANK_RUNS
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
