//! Inter-request spacing for the direct client
//!
//! One process-wide limiter serializes direct fetches: any request arriving
//! within `min_interval` of the previous one sleeps the remainder. Holding
//! the async mutex across the sleep is what enforces the spacing for
//! concurrent callers. Cancellation is honored by dropping the future.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between direct requests
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(5);

static GLOBAL_LIMITER: Lazy<Arc<RateLimiter>> =
    Lazy::new(|| Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)));

/// Process-wide limiter used by production clients
pub fn global_rate_limiter() -> Arc<RateLimiter> {
    GLOBAL_LIMITER.clone()
}

/// Minimum-interval limiter
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request slot, then claim it
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limiter sleeping");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Forget the last request time (test seam)
    pub async fn reset(&self) {
        *self.last_request.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_second_request_waits_full_interval() {
        let limiter = RateLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_spaced() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(5)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            }));
        }

        let mut times: Vec<Instant> = Vec::new();
        for handle in handles {
            times.push(handle.await.unwrap());
        }
        times.sort();

        // Three acquisitions spread across two full intervals
        assert!(times[2].duration_since(start) >= Duration::from_secs(10));
        assert!(times[1].duration_since(times[0]) >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_spacing() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        limiter.acquire().await;
        limiter.reset().await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
