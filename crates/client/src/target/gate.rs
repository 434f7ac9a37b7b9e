//! Private-address gate for navigation targets.
//!
//! The browser follows whatever URL it is given, so before a session is
//! created the target host is resolved and every answer must be a public
//! address.

use std::net::IpAddr;

use url::{Host, Url};

/// Error type for target gating failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),
}

/// Check if an IP address is private, reserved, or otherwise not routable
/// on the public internet.
///
/// Covers loopback, RFC 1918, link-local, multicast, broadcast, unspecified,
/// `0.0.0.0/8`, IPv6 unique local (`fc00::/7`), and IPv4-mapped forms of all
/// of these.
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Reject a single address if it is private or reserved.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if is_private_or_reserved(ip) { Err(SsrfError::BlockedIp(ip)) } else { Ok(()) }
}

/// Resolve the URL's host and validate every resolved address.
///
/// IP-literal hosts are checked without a DNS lookup.
pub async fn ensure_public_host(url: &Url) -> Result<(), SsrfError> {
    let port = url.port_or_known_default().unwrap_or(443);

    let host = match url.host() {
        Some(Host::Ipv4(v4)) => return validate_ip(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => return validate_ip(IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => domain.to_string(),
        None => return Err(SsrfError::DnsError("URL has no host".into())),
    };

    let addrs: Vec<_> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| SsrfError::DnsError(format!("{host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(SsrfError::DnsError(format!("{host}: no addresses")));
    }

    for addr in &addrs {
        validate_ip(addr.ip())?;
    }

    tracing::debug!(host = %host, count = addrs.len(), "target host resolved to public addresses");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_blocked_ranges() {
        let blocked: [IpAddr; 12] = [
            Ipv4Addr::new(127, 0, 0, 1).into(),
            Ipv4Addr::new(10, 0, 0, 1).into(),
            Ipv4Addr::new(172, 31, 255, 255).into(),
            Ipv4Addr::new(192, 168, 1, 1).into(),
            Ipv4Addr::new(169, 254, 169, 254).into(),
            Ipv4Addr::new(224, 0, 0, 1).into(),
            Ipv4Addr::UNSPECIFIED.into(),
            Ipv4Addr::new(0, 0, 0, 1).into(),
            Ipv6Addr::LOCALHOST.into(),
            Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 1).into(),
            Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1).into(),
            Ipv4Addr::new(127, 0, 0, 1).to_ipv6_mapped().into(),
        ];

        for ip in blocked {
            assert!(is_private_or_reserved(ip), "{ip} should be blocked");
        }
    }

    #[test]
    fn test_public_addresses_pass() {
        let public: [IpAddr; 3] = [
            Ipv4Addr::new(8, 8, 8, 8).into(),
            Ipv4Addr::new(93, 184, 216, 34).into(),
            Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888).into(),
        ];

        for ip in public {
            assert!(validate_ip(ip).is_ok(), "{ip} should pass");
        }
    }

    #[tokio::test]
    async fn test_ensure_public_host_ip_literal() {
        let url = Url::parse("http://127.0.0.1:8080/admin").unwrap();
        let result = ensure_public_host(&url).await;
        assert_eq!(result, Err(SsrfError::BlockedIp(Ipv4Addr::LOCALHOST.into())));

        let url = Url::parse("http://[::1]/").unwrap();
        assert!(matches!(ensure_public_host(&url).await, Err(SsrfError::BlockedIp(_))));

        let url = Url::parse("https://8.8.8.8/").unwrap();
        assert!(ensure_public_host(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_public_host_localhost_name() {
        let url = Url::parse("http://localhost:3000/").unwrap();
        assert!(matches!(ensure_public_host(&url).await, Err(SsrfError::BlockedIp(_))));
    }
}
