//! Browser-like request headers
//!
//! News origins increasingly reject bare clients; the fabric sends a
//! realistic header set and can rotate through a pool of current browser
//! user agents.

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};

/// Current desktop browser user agents used by rotation
pub const USER_AGENT_POOL: [&str; 4] = [
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Pick a user agent: rotated from the pool, or the configured fixed one
pub fn select_user_agent(fixed: &str, rotate: bool) -> String {
    if rotate {
        USER_AGENT_POOL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(fixed)
            .to_string()
    } else {
        fixed.to_string()
    }
}

/// Header set resembling a real browser navigation
pub fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,en-US;q=0.7,en;q=0.3"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
        headers.insert(reqwest::header::USER_AGENT, ua);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_user_agent() {
        let ua = select_user_agent("fixed-ua/1.0", false);
        assert_eq!(ua, "fixed-ua/1.0");
    }

    #[test]
    fn test_rotation_stays_in_pool() {
        for _ in 0..16 {
            let ua = select_user_agent("fixed-ua/1.0", true);
            assert!(USER_AGENT_POOL.contains(&ua.as_str()));
        }
    }

    #[test]
    fn test_browser_headers_present() {
        let headers = browser_headers(USER_AGENT_POOL[0]);
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key("Sec-Fetch-Mode"));
        assert_eq!(
            headers.get(reqwest::header::USER_AGENT).unwrap(),
            USER_AGENT_POOL[0]
        );
    }
}
