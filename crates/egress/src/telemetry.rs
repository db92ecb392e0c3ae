//! Egress telemetry
//!
//! Two layers of accounting per call: a global latency/error summary and a
//! per-hostname record. Domain entries are created on first request and
//! never destroyed. The global summary is logged every 50th request and
//! each domain record every 25th request to that domain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::ErrorCategory;

const GLOBAL_LOG_EVERY: u64 = 50;
const DOMAIN_LOG_EVERY: u64 = 25;

static GLOBAL_TELEMETRY: Lazy<Arc<EgressTelemetry>> =
    Lazy::new(|| Arc::new(EgressTelemetry::new()));

/// Process-wide telemetry used by production clients
pub fn global_telemetry() -> Arc<EgressTelemetry> {
    GLOBAL_TELEMETRY.clone()
}

/// Per-hostname counters; created on first request, never destroyed
#[derive(Debug, Default)]
pub struct DomainStats {
    pub total: AtomicU64,
    pub successful: AtomicU64,
    pub failed: AtomicU64,
    pub bot_detections: AtomicU64,
    pub consecutive_errors: AtomicU64,
    pub latency_ms_sum: AtomicU64,
    pub dns_latency_ms_sum: AtomicU64,
}

impl DomainStats {
    pub fn success_rate(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 1.0;
        }
        self.successful.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn bot_detection_rate(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.bot_detections.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.latency_ms_sum.load(Ordering::Relaxed) as f64 / total as f64
    }

    /// Health score in 0..=100
    ///
    /// Starts at 100 and subtracts:
    /// - 2 points per success-rate point below 95%
    /// - 3 points per bot-detection-rate point
    /// - 2 points per consecutive error beyond 5
    /// - 1 point per 200 ms of average latency beyond 10 s
    pub fn health_score(&self) -> f64 {
        let mut score = 100.0;

        let success_pct = self.success_rate() * 100.0;
        if success_pct < 95.0 {
            score -= 2.0 * (95.0 - success_pct);
        }

        score -= 3.0 * (self.bot_detection_rate() * 100.0);

        let consecutive = self.consecutive_errors.load(Ordering::Relaxed);
        if consecutive > 5 {
            score -= 2.0 * (consecutive - 5) as f64;
        }

        let avg_latency = self.avg_latency_ms();
        if avg_latency > 10_000.0 {
            score -= (avg_latency - 10_000.0) / 200.0;
        }

        score.max(0.0)
    }

    /// Heuristic: the origin is likely serving a bot wall
    pub fn bot_detection_suspected(&self) -> bool {
        self.total.load(Ordering::Relaxed) >= 5
            && (self.bot_detection_rate() > 0.5
                || self.consecutive_errors.load(Ordering::Relaxed) >= 10)
    }
}

/// Global summary counters
#[derive(Debug, Default)]
struct GlobalStats {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    config_errors: AtomicU64,
    timeout_errors: AtomicU64,
    connection_errors: AtomicU64,
    dns_errors: AtomicU64,
    latency_ms_sum: AtomicU64,
}

/// Egress accounting: global summary plus the per-domain registry
pub struct EgressTelemetry {
    global: GlobalStats,
    domains: RwLock<HashMap<String, Arc<DomainStats>>>,
}

impl Default for EgressTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl EgressTelemetry {
    pub fn new() -> Self {
        Self {
            global: GlobalStats::default(),
            domains: RwLock::new(HashMap::new()),
        }
    }

    /// Entry for a hostname, created on first use
    pub fn domain(&self, host: &str) -> Arc<DomainStats> {
        if let Some(stats) = self.domains.read().get(host) {
            return stats.clone();
        }
        self.domains
            .write()
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(DomainStats::default()))
            .clone()
    }

    /// Record a completed request
    pub fn record_success(&self, host: &str, latency_ms: u64) {
        metrics::counter!("newsflow_egress_requests_total", "outcome" => "success")
            .increment(1);
        metrics::histogram!("newsflow_egress_latency_ms").record(latency_ms as f64);

        self.global.total.fetch_add(1, Ordering::Relaxed);
        self.global.successful.fetch_add(1, Ordering::Relaxed);
        self.global
            .latency_ms_sum
            .fetch_add(latency_ms, Ordering::Relaxed);

        let stats = self.domain(host);
        stats.total.fetch_add(1, Ordering::Relaxed);
        stats.successful.fetch_add(1, Ordering::Relaxed);
        stats.latency_ms_sum.fetch_add(latency_ms, Ordering::Relaxed);
        stats.consecutive_errors.store(0, Ordering::Relaxed);

        self.maybe_log(host, &stats);
    }

    /// Record a failed request in the given error bucket
    pub fn record_failure(
        &self,
        host: &str,
        category: ErrorCategory,
        bot_detected: bool,
        latency_ms: u64,
    ) {
        metrics::counter!(
            "newsflow_egress_requests_total",
            "outcome" => "failure",
            "category" => category.as_str()
        )
        .increment(1);

        self.global.total.fetch_add(1, Ordering::Relaxed);
        self.global.failed.fetch_add(1, Ordering::Relaxed);
        self.global
            .latency_ms_sum
            .fetch_add(latency_ms, Ordering::Relaxed);
        let bucket = match category {
            ErrorCategory::Config => &self.global.config_errors,
            ErrorCategory::Timeout => &self.global.timeout_errors,
            ErrorCategory::Connection => &self.global.connection_errors,
            ErrorCategory::Dns => &self.global.dns_errors,
        };
        bucket.fetch_add(1, Ordering::Relaxed);

        let stats = self.domain(host);
        stats.total.fetch_add(1, Ordering::Relaxed);
        stats.failed.fetch_add(1, Ordering::Relaxed);
        stats.latency_ms_sum.fetch_add(latency_ms, Ordering::Relaxed);
        stats.consecutive_errors.fetch_add(1, Ordering::Relaxed);
        if bot_detected {
            stats.bot_detections.fetch_add(1, Ordering::Relaxed);
        }

        self.maybe_log(host, &stats);
    }

    /// Record DNS pre-resolution latency (proxy variant)
    pub fn record_dns_latency(&self, host: &str, latency_ms: u64) {
        metrics::histogram!("newsflow_egress_dns_latency_ms").record(latency_ms as f64);
        self.domain(host)
            .dns_latency_ms_sum
            .fetch_add(latency_ms, Ordering::Relaxed);
    }

    /// Per-category error count in the global summary (test/ops accessor)
    pub fn global_error_count(&self, category: ErrorCategory) -> u64 {
        match category {
            ErrorCategory::Config => self.global.config_errors.load(Ordering::Relaxed),
            ErrorCategory::Timeout => self.global.timeout_errors.load(Ordering::Relaxed),
            ErrorCategory::Connection => self.global.connection_errors.load(Ordering::Relaxed),
            ErrorCategory::Dns => self.global.dns_errors.load(Ordering::Relaxed),
        }
    }

    pub fn global_total(&self) -> u64 {
        self.global.total.load(Ordering::Relaxed)
    }

    fn maybe_log(&self, host: &str, stats: &DomainStats) {
        let global_total = self.global.total.load(Ordering::Relaxed);
        if global_total % GLOBAL_LOG_EVERY == 0 {
            let total = global_total.max(1);
            tracing::info!(
                total = global_total,
                successful = self.global.successful.load(Ordering::Relaxed),
                failed = self.global.failed.load(Ordering::Relaxed),
                config = self.global.config_errors.load(Ordering::Relaxed),
                timeout = self.global.timeout_errors.load(Ordering::Relaxed),
                connection = self.global.connection_errors.load(Ordering::Relaxed),
                dns = self.global.dns_errors.load(Ordering::Relaxed),
                avg_latency_ms =
                    self.global.latency_ms_sum.load(Ordering::Relaxed) / total,
                "egress summary"
            );
        }

        let domain_total = stats.total.load(Ordering::Relaxed);
        if domain_total % DOMAIN_LOG_EVERY == 0 {
            tracing::info!(
                host,
                total = domain_total,
                success_rate = stats.success_rate(),
                health_score = stats.health_score(),
                bot_suspected = stats.bot_detection_suspected(),
                "domain summary"
            );
        }
    }
}
