//! Direct egress client
//!
//! Fetches straight from the origin through a shared, tuned connection
//! pool. Every target passes the SSRF screen (including DNS pre-resolution
//! for hostname targets) before any connect, and all requests share the
//! process-wide inter-request spacing.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use url::Url;

use newsflow_config::EgressConfig;

use crate::headers::{browser_headers, select_user_agent};
use crate::ratelimit::RateLimiter;
use crate::ssrf::{screen_ip, screen_target};
use crate::telemetry::EgressTelemetry;
use crate::{EgressError, FetchResponse, HttpFetcher};

pub struct DirectClient {
    client: reqwest::Client,
    config: EgressConfig,
    limiter: Arc<RateLimiter>,
    telemetry: Arc<EgressTelemetry>,
}

impl DirectClient {
    pub fn new(
        config: EgressConfig,
        limiter: Arc<RateLimiter>,
        telemetry: Arc<EgressTelemetry>,
    ) -> Result<Self, EgressError> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.direct_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(config.max_idle_conns_per_host)
            .pool_idle_timeout(config.idle_conn_timeout())
            .redirect(redirect)
            .build()
            .map_err(|e| EgressError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            limiter,
            telemetry,
        })
    }

    /// Resolve a hostname target and screen every address before connecting
    async fn preresolve_and_screen(&self, url: &Url) -> Result<(), EgressError> {
        let host = match url.host_str() {
            Some(host) => host,
            None => return Err(EgressError::Config("URL has no host".to_string())),
        };
        // IP literals were already screened by screen_target
        if url.domain().is_none() {
            return Ok(());
        }
        let port = url.port_or_known_default().unwrap_or(443);

        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| EgressError::Dns(format!("{host}: {e}")))?;

        let mut any = false;
        for addr in addrs {
            any = true;
            screen_ip(addr.ip())?;
        }
        if !any {
            return Err(EgressError::Dns(format!("{host}: no addresses")));
        }
        Ok(())
    }

    fn record_error(&self, host: &str, err: &EgressError, bot_detected: bool, latency_ms: u64) {
        self.telemetry
            .record_failure(host, err.category(), bot_detected, latency_ms);
    }
}

#[async_trait]
impl HttpFetcher for DirectClient {
    async fn get(&self, raw_url: &str) -> Result<FetchResponse, EgressError> {
        let url = Url::parse(raw_url)
            .map_err(|e| EgressError::Config(format!("invalid URL {raw_url:?}: {e}")))?;
        let host = url.host_str().unwrap_or("unknown").to_string();

        if let Err(err) = screen_target(&url) {
            self.record_error(&host, &err, false, 0);
            return Err(err);
        }
        if let Err(err) = self.preresolve_and_screen(&url).await {
            self.record_error(&host, &err, false, 0);
            return Err(err);
        }

        self.limiter.acquire().await;

        let mut request = self.client.get(url.clone());
        if self.config.enable_browser_headers {
            let ua = select_user_agent(&self.config.user_agent, self.config.rotate_user_agents);
            request = request.headers(browser_headers(&ua));
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = EgressError::from(e);
                self.record_error(&host, &err, false, started.elapsed().as_millis() as u64);
                return Err(err);
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let status = response.status();
        if status.as_u16() >= 400 && self.config.skip_error_responses {
            // Close the body without reading it
            drop(response);
            let err = EgressError::Status {
                status: status.as_u16(),
                message: format!("{host} answered {status}"),
            };
            self.record_error(&host, &err, true, latency_ms);
            tracing::warn!(host = %host, status = status.as_u16(), "origin rejected request");
            return Err(err);
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let err = EgressError::from(e);
                self.record_error(&host, &err, false, latency_ms);
                return Err(err);
            }
        };

        self.telemetry.record_success(&host, latency_ms);
        Ok(FetchResponse {
            status: status.as_u16(),
            body,
            content_type,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;
    use std::time::Duration;

    fn client() -> (DirectClient, Arc<EgressTelemetry>) {
        let telemetry = Arc::new(EgressTelemetry::new());
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(0)));
        let client = DirectClient::new(EgressConfig::default(), limiter, telemetry.clone())
            .unwrap();
        (client, telemetry)
    }

    #[tokio::test]
    async fn test_metadata_endpoint_refused_without_connect() {
        let (client, telemetry) = client();
        let err = client.get("http://169.254.169.254/").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(telemetry.global_error_count(ErrorCategory::Config), 1);
        let stats = telemetry.domain("169.254.169.254");
        assert_eq!(stats.failed.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_blocked_port_refused() {
        let (client, telemetry) = client();
        let err = client
            .get("https://example.internal:22/")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(telemetry.global_error_count(ErrorCategory::Config), 1);
    }

    #[tokio::test]
    async fn test_bad_scheme_refused() {
        let (client, _) = client();
        let err = client.get("ftp://example.com/feed").await.unwrap_err();
        assert!(matches!(err, EgressError::Config(_)));
    }

    #[tokio::test]
    async fn test_unparseable_url() {
        let (client, _) = client();
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, EgressError::Config(_)));
    }
}
