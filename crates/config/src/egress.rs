//! HTTP egress configuration
//!
//! The recognized option set for the egress fabric. Invalid critical fields
//! (e.g. empty `proxy_base_url` with `use_proxy = true`) do not fail
//! startup; the factory resolves them to an error-stub client instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Egress client options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EgressConfig {
    /// Route requests through the egress proxy instead of connecting directly
    pub use_proxy: bool,
    /// Proxy base URL, required when `use_proxy` is set
    pub proxy_base_url: String,
    /// Path prefix prepended to the target host on the proxy
    pub proxy_path_prefix: String,
    /// Per-request timeout for the proxy client (seconds)
    pub proxy_timeout_secs: u64,
    /// Per-request timeout for the direct client (seconds)
    pub direct_timeout_secs: u64,
    /// Connection pool: total idle connections
    pub max_idle_conns: usize,
    /// Connection pool: idle connections per host
    pub max_idle_conns_per_host: usize,
    /// Idle connection lifetime (seconds)
    pub idle_conn_timeout_secs: u64,
    /// TLS handshake timeout (seconds); folded into the connect timeout
    pub tls_handshake_timeout_secs: u64,
    /// Expect-continue timeout (seconds); recognized but unmapped
    pub expect_continue_timeout_secs: u64,
    /// Redirect hop limit when following redirects
    pub max_redirects: usize,
    /// Follow redirects at all
    pub follow_redirects: bool,
    /// Send browser-like request headers
    pub enable_browser_headers: bool,
    /// Fixed user agent when rotation is off
    pub user_agent: String,
    /// Rotate through a browser user-agent pool per request
    pub rotate_user_agents: bool,
    /// Treat HTTP status >= 400 as a failure (body closed, error returned)
    pub skip_error_responses: bool,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            use_proxy: false,
            proxy_base_url: String::new(),
            proxy_path_prefix: "/proxy/https://".to_string(),
            proxy_timeout_secs: 60,
            direct_timeout_secs: 30,
            max_idle_conns: 100,
            max_idle_conns_per_host: 10,
            idle_conn_timeout_secs: 90,
            tls_handshake_timeout_secs: 10,
            expect_continue_timeout_secs: 1,
            max_redirects: 10,
            follow_redirects: true,
            enable_browser_headers: true,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            rotate_user_agents: false,
            skip_error_responses: true,
        }
    }
}

impl EgressConfig {
    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_timeout_secs)
    }

    pub fn direct_timeout(&self) -> Duration {
        Duration::from_secs(self.direct_timeout_secs)
    }

    pub fn idle_conn_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_conn_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_handshake_timeout_secs)
    }

    /// Validate critical fields; the factory turns an `Err` into the
    /// error-stub client rather than failing startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_proxy && self.proxy_base_url.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "egress.proxy_base_url (required when use_proxy = true)".to_string(),
            ));
        }
        if self.direct_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "egress.direct_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.use_proxy && self.proxy_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "egress.proxy_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EgressConfig::default().validate().is_ok());
    }

    #[test]
    fn test_proxy_requires_base_url() {
        let config = EgressConfig {
            use_proxy: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EgressConfig {
            direct_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_proxy_prefix() {
        assert_eq!(EgressConfig::default().proxy_path_prefix, "/proxy/https://");
    }
}
