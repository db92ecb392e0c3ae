//! HTTP egress fabric
//!
//! Policy-driven client selection for all outbound article fetching:
//! - Direct client with a tuned connection pool, browser-like headers,
//!   SSRF screening and process-wide request spacing
//! - Proxy client with DNS pre-resolution and resolved-IP forwarding
//! - Error-stub client produced when the egress configuration is invalid
//! - Per-domain telemetry with a health score and bot-detection heuristic

pub mod direct;
pub mod factory;
pub mod headers;
pub mod proxy;
pub mod ratelimit;
pub mod ssrf;
pub mod telemetry;

pub use direct::DirectClient;
pub use factory::{build_fetcher, ErrorStubClient};
pub use proxy::ProxyClient;
pub use ratelimit::{global_rate_limiter, RateLimiter};
pub use ssrf::{screen_target, BLOCKED_PORTS};
pub use telemetry::{global_telemetry, DomainStats, EgressTelemetry};

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// Content-Type header, when present
    pub content_type: Option<String>,
    /// URL after redirects
    pub final_url: String,
}

/// The single capability the fabric exposes
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, EgressError>;
}

/// Egress errors
#[derive(Error, Debug, Clone)]
pub enum EgressError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("dns resolution failed: {0}")]
    Dns(String),
}

/// Telemetry bucket an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Timeout,
    Connection,
    Dns,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Connection => "connection",
            ErrorCategory::Dns => "dns",
        }
    }
}

impl EgressError {
    /// Bucket for per-domain accounting. HTTP statuses land in the
    /// connection bucket (with the bot-detection flag set by the caller).
    pub fn category(&self) -> ErrorCategory {
        match self {
            EgressError::Config(_) => ErrorCategory::Config,
            EgressError::Timeout(_) => ErrorCategory::Timeout,
            EgressError::Connection(_) | EgressError::Status { .. } => ErrorCategory::Connection,
            EgressError::Dns(_) => ErrorCategory::Dns,
        }
    }

    /// Transient errors worth retrying: timeouts, connection resets, DNS,
    /// and HTTP 408/429/5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            EgressError::Timeout(_) | EgressError::Connection(_) | EgressError::Dns(_) => true,
            EgressError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..=599).contains(status)
            }
            EgressError::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for EgressError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EgressError::Timeout(err.to_string())
        } else {
            EgressError::Connection(err.to_string())
        }
    }
}

impl From<EgressError> for newsflow_core::Error {
    fn from(err: EgressError) -> Self {
        newsflow_core::Error::Egress(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            EgressError::Config("bad".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            EgressError::Status {
                status: 403,
                message: "forbidden".into()
            }
            .category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            EgressError::Dns("nxdomain".into()).category(),
            ErrorCategory::Dns
        );
    }

    #[test]
    fn test_retryable_statuses() {
        let retryable = [408u16, 429, 500, 503];
        for status in retryable {
            assert!(EgressError::Status {
                status,
                message: String::new()
            }
            .is_retryable());
        }
        assert!(!EgressError::Status {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!EgressError::Config("bad".into()).is_retryable());
        assert!(EgressError::Timeout("t".into()).is_retryable());
    }
}
