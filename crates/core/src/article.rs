//! Article and summary types
//!
//! Articles are produced by the upstream feed sync and are immutable from
//! the core's viewpoint except for content sanitization on ingest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External content unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Article ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Title
    pub title: String,
    /// Origin URL
    pub url: String,
    /// Sanitized plain-text content
    pub content: String,
    /// Publication timestamp
    pub published_at: DateTime<Utc>,
}

impl Article {
    /// Whether there is any content worth summarizing
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// One localized summary for one `(article, user)` pair
///
/// Invariant: at most one live summary per `(article_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    /// Summary ID
    pub id: String,
    /// Summarized article
    pub article_id: String,
    /// Owning user
    pub user_id: String,
    /// Localized summary text
    pub summary: String,
    /// Summary language tag (e.g. "ja", "en")
    pub language: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An article joined with its live summary, as paged by the quality judge
#[derive(Debug, Clone)]
pub struct ArticleWithSummary {
    pub article: Article,
    pub summary: ArticleSummary,
}

/// Result of a summarizer call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizedContent {
    /// Summary text
    pub summary: String,
    /// Language of the summary
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str) -> Article {
        Article {
            id: "a-1".to_string(),
            user_id: "u-1".to_string(),
            title: "Title".to_string(),
            url: "https://example.com/a".to_string(),
            content: content.to_string(),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_content() {
        assert!(article("body text").has_content());
        assert!(!article("").has_content());
        assert!(!article("   \n\t").has_content());
    }
}
