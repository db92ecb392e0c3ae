//! SSRF screening
//!
//! Every target is screened before any TCP connect: non-HTTP(S) schemes,
//! sensitive ports, and private / link-local / loopback / metadata hosts
//! are rejected. Hostname targets are additionally checked after DNS
//! pre-resolution by the clients.

use std::net::IpAddr;

use url::{Host, Url};

use crate::EgressError;

/// Ports never fetched from, regardless of host
pub const BLOCKED_PORTS: [u16; 13] = [
    22, 23, 25, 53, 110, 143, 993, 995, 1433, 3306, 5432, 6379, 11211,
];

/// Screen scheme, port, and literal host before resolution
pub fn screen_target(url: &Url) -> Result<(), EgressError> {
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(EgressError::Config(format!(
                "scheme {other:?} not allowed"
            )))
        }
    }

    if let Some(port) = url.port() {
        if BLOCKED_PORTS.contains(&port) {
            return Err(EgressError::Config(format!("port {port} is blocked")));
        }
    }

    match url.host() {
        Some(Host::Ipv4(ip)) => screen_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => screen_ip(IpAddr::V6(ip)),
        Some(Host::Domain(domain)) => {
            if domain.eq_ignore_ascii_case("localhost") {
                return Err(EgressError::Config("loopback host blocked".to_string()));
            }
            Ok(())
        }
        None => Err(EgressError::Config("URL has no host".to_string())),
    }
}

/// Screen one resolved address
pub fn screen_ip(ip: IpAddr) -> Result<(), EgressError> {
    if is_blocked_ip(ip) {
        return Err(EgressError::Config(format!(
            "address {ip} is private, loopback, link-local or metadata"
        )));
    }
    Ok(())
}

/// Private, loopback, link-local and cloud-metadata address classification
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                // Cloud metadata endpoint sits inside link-local space, but
                // keep the explicit check for clarity in audits.
                || v4.octets() == [169, 254, 169, 254]
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fe80::/10 link-local
                || (v6.segments()[0] & 0xffc0) == 0xfe80
                // fc00::/7 unique-local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
        }
    }
}
