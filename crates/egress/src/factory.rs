//! Egress client factory
//!
//! Assembles the configured client variant. An invalid configuration does
//! not abort startup; it resolves to an error-stub client whose every call
//! returns the configuration error, so the pipeline degrades instead of
//! crashing.

use std::sync::Arc;

use async_trait::async_trait;

use newsflow_config::EgressConfig;

use crate::direct::DirectClient;
use crate::proxy::ProxyClient;
use crate::ratelimit::global_rate_limiter;
use crate::telemetry::global_telemetry;
use crate::{EgressError, FetchResponse, HttpFetcher};

/// Client whose every call fails with the configuration error it was built
/// from
pub struct ErrorStubClient {
    error: String,
}

impl ErrorStubClient {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[async_trait]
impl HttpFetcher for ErrorStubClient {
    async fn get(&self, _url: &str) -> Result<FetchResponse, EgressError> {
        Err(EgressError::Config(self.error.clone()))
    }
}

/// Build the configured fetcher
pub fn build_fetcher(config: &EgressConfig) -> Arc<dyn HttpFetcher> {
    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid egress configuration, using error stub");
        return Arc::new(ErrorStubClient::new(err.to_string()));
    }

    if config.use_proxy {
        match ProxyClient::new(config.clone(), global_telemetry()) {
            Ok(client) => {
                tracing::info!(proxy = %config.proxy_base_url, "egress: proxy client");
                Arc::new(client)
            }
            Err(err) => {
                tracing::error!(error = %err, "proxy client construction failed, using error stub");
                Arc::new(ErrorStubClient::new(err.to_string()))
            }
        }
    } else {
        match DirectClient::new(config.clone(), global_rate_limiter(), global_telemetry()) {
            Ok(client) => {
                tracing::info!("egress: direct client");
                Arc::new(client)
            }
            Err(err) => {
                tracing::error!(error = %err, "direct client construction failed, using error stub");
                Arc::new(ErrorStubClient::new(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_proxy_config_resolves_to_stub() {
        let config = EgressConfig {
            use_proxy: true,
            proxy_base_url: String::new(),
            ..Default::default()
        };
        let fetcher = build_fetcher(&config);
        let err = fetcher.get("https://example.com/").await.unwrap_err();
        assert!(matches!(err, EgressError::Config(_)));

        // The stub fails every call, not just the first
        let err = fetcher.get("https://other.example.com/").await.unwrap_err();
        assert!(matches!(err, EgressError::Config(_)));
    }

    #[tokio::test]
    async fn test_valid_config_builds_direct() {
        let fetcher = build_fetcher(&EgressConfig::default());
        // The direct client screens before connecting, so a blocked target
        // proves we did not get the stub.
        let err = fetcher.get("http://127.0.0.1/").await.unwrap_err();
        assert!(err.to_string().contains("loopback") || err.to_string().contains("private"));
    }
}
