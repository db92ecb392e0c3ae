//! Proxying egress client
//!
//! Routes HTTPS targets through the egress proxy. The target host is
//! resolved locally first (first IPv4 address preferred, first IPv6 as
//! fallback) and forwarded in `X-Resolved-IP` / `X-Target-Domain`; the
//! proxy connects to exactly that address. DNS latency is accounted per
//! target domain.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use url::Url;

use newsflow_config::EgressConfig;

use crate::headers::{browser_headers, select_user_agent};
use crate::ssrf::{screen_ip, screen_target};
use crate::telemetry::EgressTelemetry;
use crate::{EgressError, FetchResponse, HttpFetcher};

pub struct ProxyClient {
    client: reqwest::Client,
    config: EgressConfig,
    telemetry: Arc<EgressTelemetry>,
}

impl ProxyClient {
    pub fn new(
        config: EgressConfig,
        telemetry: Arc<EgressTelemetry>,
    ) -> Result<Self, EgressError> {
        if config.proxy_base_url.trim().is_empty() {
            return Err(EgressError::Config(
                "proxy_base_url is required for the proxy client".to_string(),
            ));
        }

        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.proxy_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(config.max_idle_conns_per_host)
            .pool_idle_timeout(config.idle_conn_timeout())
            .redirect(redirect)
            .build()
            .map_err(|e| EgressError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            telemetry,
        })
    }

    /// Resolve the target host, preferring the first IPv4 address
    async fn resolve_target(&self, host: &str, port: u16) -> Result<IpAddr, EgressError> {
        let started = Instant::now();
        let addrs: Vec<_> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| EgressError::Dns(format!("{host}: {e}")))?
            .collect();
        self.telemetry
            .record_dns_latency(host, started.elapsed().as_millis() as u64);

        let resolved = addrs
            .iter()
            .map(|a| a.ip())
            .find(IpAddr::is_ipv4)
            .or_else(|| addrs.first().map(|a| a.ip()))
            .ok_or_else(|| EgressError::Dns(format!("{host}: no addresses")))?;

        screen_ip(resolved)?;
        Ok(resolved)
    }
}

/// Rewritten request URL: `{proxy_base}{proxy_prefix}{host}{path}?{query}`
pub(crate) fn build_proxy_url(base: &str, prefix: &str, target: &Url) -> String {
    let base = base.trim_end_matches('/');
    let prefix = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    };
    let host = target.host_str().unwrap_or_default();
    let path = target.path();
    match target.query() {
        Some(query) => format!("{base}{prefix}{host}{path}?{query}"),
        None => format!("{base}{prefix}{host}{path}"),
    }
}

#[async_trait]
impl HttpFetcher for ProxyClient {
    async fn get(&self, raw_url: &str) -> Result<FetchResponse, EgressError> {
        let url = Url::parse(raw_url)
            .map_err(|e| EgressError::Config(format!("invalid URL {raw_url:?}: {e}")))?;
        let host = url.host_str().unwrap_or("unknown").to_string();

        if url.scheme() != "https" {
            let err = EgressError::Config(format!(
                "proxy client only accepts HTTPS targets, got {:?}",
                url.scheme()
            ));
            self.telemetry.record_failure(&host, err.category(), false, 0);
            return Err(err);
        }
        if let Err(err) = screen_target(&url) {
            self.telemetry.record_failure(&host, err.category(), false, 0);
            return Err(err);
        }

        let port = url.port_or_known_default().unwrap_or(443);
        let resolved = match self.resolve_target(&host, port).await {
            Ok(ip) => ip,
            Err(err) => {
                self.telemetry.record_failure(&host, err.category(), false, 0);
                return Err(err);
            }
        };

        let proxy_url = build_proxy_url(
            &self.config.proxy_base_url,
            &self.config.proxy_path_prefix,
            &url,
        );

        let mut request = self
            .client
            .get(&proxy_url)
            .header("X-Resolved-IP", resolved.to_string())
            .header("X-Target-Domain", &host);
        if self.config.enable_browser_headers {
            let ua = select_user_agent(&self.config.user_agent, self.config.rotate_user_agents);
            request = request.headers(browser_headers(&ua));
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = EgressError::from(e);
                self.telemetry.record_failure(
                    &host,
                    err.category(),
                    false,
                    started.elapsed().as_millis() as u64,
                );
                return Err(err);
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let status = response.status();
        if status.as_u16() >= 400 && self.config.skip_error_responses {
            drop(response);
            let err = EgressError::Status {
                status: status.as_u16(),
                message: format!("{host} answered {status} via proxy"),
            };
            self.telemetry
                .record_failure(&host, err.category(), true, latency_ms);
            tracing::warn!(host = %host, status = status.as_u16(), "proxied origin rejected request");
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
                self.telemetry
                    .record_failure(&host, err.category(), false, latency_ms);
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
