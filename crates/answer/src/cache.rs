//! Answer cache
//!
//! Bounded concurrent map with per-entry TTL. The key covers everything
//! that shapes an answer: query, candidate set (order-insensitive),
//! locale, and the chunk/token limits.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use newsflow_core::clock::SharedClock;

use crate::envelope::AnswerOutput;

struct CacheEntry {
    output: AnswerOutput,
    inserted_at: DateTime<Utc>,
}

pub struct AnswerCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
    clock: SharedClock,
}

impl AnswerCache {
    pub fn new(ttl: Duration, capacity: usize, clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
            clock,
        }
    }

    /// Cache key for one answer request
    pub fn key(
        query: &str,
        candidate_article_ids: Option<&[String]>,
        locale: &str,
        max_chunks: usize,
        max_tokens: u32,
    ) -> String {
        let mut ids: Vec<&str> = candidate_article_ids
            .unwrap_or(&[])
            .iter()
            .map(String::as_str)
            .collect();
        ids.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update([0]);
        for id in ids {
            hasher.update(id.as_bytes());
            hasher.update([1]);
        }
        hasher.update(locale.as_bytes());
        hasher.update(max_chunks.to_le_bytes());
        hasher.update(max_tokens.to_le_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<AnswerOutput> {
        let entry = self.entries.get(key)?;
        let age = self
            .clock
            .now()
            .signed_duration_since(entry.inserted_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        if age >= self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.output.clone())
    }

    pub fn insert(&self, key: String, output: AnswerOutput) {
        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(
            key,
            CacheEntry {
                output,
                inserted_at: self.clock.now(),
            },
        );
    }

    /// Drop expired entries; if still full, drop an arbitrary one to stay
    /// bounded
    fn evict(&self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| {
            now.signed_duration_since(entry.inserted_at)
                .to_std()
                .map(|age| age < ttl)
                .unwrap_or(false)
        });

        if self.entries.len() >= self.capacity {
            let key = self.entries.iter().next().map(|e| e.key().clone());
            if let Some(key) = key {
                self.entries.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Test/ops seam
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsflow_core::Clock;
    use std::sync::{Arc, Mutex};

    struct TestClock(Mutex<DateTime<Utc>>);

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, duration: Duration) {
            *self.0.lock().unwrap() += chrono::Duration::from_std(duration).unwrap();
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn output(answer: &str) -> AnswerOutput {
        AnswerOutput {
            answer: answer.to_string(),
            citations: Vec::new(),
            contexts: Vec::new(),
            fallback: false,
            reason: String::new(),
            fallback_category: None,
        }
    }

    #[test]
    fn test_key_is_order_insensitive() {
        let a = AnswerCache::key(
            "q",
            Some(&["a".to_string(), "b".to_string()]),
            "ja",
            10,
            512,
        );
        let b = AnswerCache::key(
            "q",
            Some(&["b".to_string(), "a".to_string()]),
            "ja",
            10,
            512,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_varies_by_inputs() {
        let base = AnswerCache::key("q", None, "ja", 10, 512);
        assert_ne!(base, AnswerCache::key("q2", None, "ja", 10, 512));
        assert_ne!(base, AnswerCache::key("q", None, "en", 10, 512));
        assert_ne!(base, AnswerCache::key("q", None, "ja", 5, 512));
        assert_ne!(base, AnswerCache::key("q", None, "ja", 10, 256));
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = TestClock::new();
        let cache = AnswerCache::new(Duration::from_secs(600), 16, clock.clone());
        cache.insert("k".to_string(), output("cached"));

        assert_eq!(cache.get("k").unwrap().answer, "cached");

        clock.advance(Duration::from_secs(601));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let clock = TestClock::new();
        let cache = AnswerCache::new(Duration::from_secs(600), 4, clock);
        for i in 0..10 {
            cache.insert(format!("k{i}"), output("x"));
        }
        assert!(cache.len() <= 5);
    }
}
