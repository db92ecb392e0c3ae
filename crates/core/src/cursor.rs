//! Cursor-based pagination
//!
//! All scanners page with an opaque `(last_created_at, last_id)` token and
//! return the next cursor, or `None` when the scan is exhausted. The cursor
//! is externalized so restarted batch loops resume where they left off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque pagination token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Creation timestamp of the last row of the previous page
    pub last_created_at: Option<DateTime<Utc>>,
    /// ID of the last row of the previous page (tie-break)
    pub last_id: Option<String>,
}

impl Cursor {
    /// The cursor that starts a scan from the beginning
    pub fn start() -> Self {
        Self::default()
    }

    /// Cursor positioned after the given row
    pub fn after(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            last_created_at: Some(created_at),
            last_id: Some(id.into()),
        }
    }

    /// Whether this cursor points at the beginning of the scan
    pub fn is_start(&self) -> bool {
        self.last_created_at.is_none() && self.last_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_cursor() {
        let c = Cursor::start();
        assert!(c.is_start());
    }

    #[test]
    fn test_after_cursor() {
        let now = Utc::now();
        let c = Cursor::after(now, "row-9");
        assert!(!c.is_start());
        assert_eq!(c.last_id.as_deref(), Some("row-9"));
        assert_eq!(c.last_created_at, Some(now));
    }

    #[test]
    fn test_cursor_roundtrip() {
        let c = Cursor::after(Utc::now(), "row-1");
        let json = serde_json::to_string(&c).unwrap();
        let back: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
