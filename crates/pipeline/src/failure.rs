//! Per-article failure tracking
//!
//! The batcher keeps an in-memory map of articles that recently failed to
//! summarize. Once an article accumulates `max_failures`, further attempts
//! are skipped until the block window elapses. The tracker is local to one
//! batcher instance.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use newsflow_core::clock::SharedClock;

#[derive(Debug, Clone, Copy)]
struct FailureEntry {
    count: u32,
    last_failed_at: DateTime<Utc>,
}

/// Mutex-guarded failure map with a time-boxed block
pub struct FailureTracker {
    entries: Mutex<HashMap<String, FailureEntry>>,
    max_failures: u32,
    block_window: Duration,
    clock: SharedClock,
}

impl FailureTracker {
    pub fn new(max_failures: u32, block_window: Duration, clock: SharedClock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_failures,
            block_window,
            clock,
        }
    }

    /// Whether the article is currently blocked from summarization
    pub fn is_blocked(&self, article_id: &str) -> bool {
        let entries = self.entries.lock();
        let Some(entry) = entries.get(article_id) else {
            return false;
        };
        if entry.count < self.max_failures {
            return false;
        }
        let elapsed = self
            .clock
            .now()
            .signed_duration_since(entry.last_failed_at);
        elapsed
            .to_std()
            .map(|elapsed| elapsed < self.block_window)
            .unwrap_or(true)
    }

    /// Record one failed attempt
    pub fn record_failure(&self, article_id: &str) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.entry(article_id.to_string()).or_insert(FailureEntry {
            count: 0,
            last_failed_at: now,
        });
        entry.count += 1;
        entry.last_failed_at = now;
    }

    /// Forget an article after it summarizes successfully
    pub fn clear(&self, article_id: &str) {
        self.entries.lock().remove(article_id);
    }

    /// Tracked article count (test/ops accessor)
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsflow_core::Clock;
    use std::sync::Arc;

    struct TestClock(Mutex<DateTime<Utc>>);

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, duration: Duration) {
            let mut now = self.0.lock();
            *now += chrono::Duration::from_std(duration).unwrap();
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn tracker(clock: Arc<TestClock>) -> FailureTracker {
        FailureTracker::new(3, Duration::from_secs(3600), clock)
    }

    #[test]
    fn test_not_blocked_before_threshold() {
        let clock = TestClock::new();
        let tracker = tracker(clock);
        tracker.record_failure("a-1");
        tracker.record_failure("a-1");
        assert!(!tracker.is_blocked("a-1"));
    }

    #[test]
    fn test_blocked_at_threshold() {
        let clock = TestClock::new();
        let tracker = tracker(clock);
        for _ in 0..3 {
            tracker.record_failure("a-1");
        }
        assert!(tracker.is_blocked("a-1"));
        assert!(!tracker.is_blocked("a-2"));
    }

    #[test]
    fn test_block_expires_after_window() {
        let clock = TestClock::new();
        let tracker = tracker(clock.clone());
        for _ in 0..3 {
            tracker.record_failure("a-1");
        }
        assert!(tracker.is_blocked("a-1"));

        clock.advance(Duration::from_secs(3601));
        assert!(!tracker.is_blocked("a-1"));
    }

    #[test]
    fn test_clear_on_success() {
        let clock = TestClock::new();
        let tracker = tracker(clock);
        for _ in 0..3 {
            tracker.record_failure("a-1");
        }
        tracker.clear("a-1");
        assert!(!tracker.is_blocked("a-1"));
        assert!(tracker.is_empty());
    }
}
