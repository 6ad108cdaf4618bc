use crate::{TapMapError, UrlError};
use std::net::IpAddr;
use url::Url;

/// Identity of the domain a scan is confined to
///
/// Two URLs belong to the same domain when their hosts match exactly
/// (subdomains are distinct) and any explicit ports match. The scheme is not
/// part of the identity, so an http link on an https site stays in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainKey {
    pub host: String,
    pub port: Option<u16>,
}

impl DomainKey {
    /// Extracts the domain identity from a URL string
    ///
    /// # Examples
    ///
    /// ```
    /// use tapmap::url::DomainKey;
    ///
    /// let key = DomainKey::from_url("https://www.example.com/path").unwrap();
    /// assert_eq!(key.host, "www.example.com");
    /// assert_eq!(key.port, None);
    /// ```
    pub fn from_url(url: &str) -> Result<Self, UrlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::from_parsed(&parsed)
    }

    pub fn from_parsed(url: &Url) -> Result<Self, UrlError> {
        let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
        Ok(Self {
            host,
            port: url.port(),
        })
    }

    /// Returns true when `url` points at this domain
    ///
    /// Unparseable URLs and URLs without a host are never on-domain.
    pub fn matches(&self, url: &str) -> bool {
        match Self::from_url(url) {
            Ok(other) => *self == other,
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for DomainKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Verifies that a scan target does not point into private address space
///
/// Rejects non-http(s) schemes, `localhost`, and any host whose address (IP
/// literal, or every resolved address for a hostname) is loopback, private,
/// link-local, or otherwise non-public. Callers starting scans from user
/// input run this before touching the network with a browser.
///
/// # Returns
///
/// * `Ok(())` - The target resolves to public address space
/// * `Err(TapMapError::UnsafeTarget)` - The target is unsafe or unresolvable
pub async fn ensure_public_target(url: &str) -> Result<(), TapMapError> {
    let parsed =
        Url::parse(url).map_err(|e| TapMapError::UnsafeTarget(format!("'{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(TapMapError::UnsafeTarget(format!(
            "scheme '{}' is not allowed",
            parsed.scheme()
        )));
    }

    // IP literals are checked directly; hostnames must resolve to public
    // addresses only.
    let host = match parsed.host() {
        Some(url::Host::Ipv4(v4)) => {
            return check_literal(IpAddr::V4(v4));
        }
        Some(url::Host::Ipv6(v6)) => {
            return check_literal(IpAddr::V6(v6));
        }
        Some(url::Host::Domain(domain)) => domain.to_string(),
        None => {
            return Err(TapMapError::UnsafeTarget("URL has no host".to_string()));
        }
    };

    if host.eq_ignore_ascii_case("localhost") {
        return Err(TapMapError::UnsafeTarget(
            "localhost is not allowed".to_string(),
        ));
    }

    let port = parsed.port_or_known_default().unwrap_or(443);
    let addrs: Vec<_> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| TapMapError::UnsafeTarget(format!("could not resolve '{}': {}", host, e)))?
        .collect();

    if addrs.is_empty() {
        return Err(TapMapError::UnsafeTarget(format!(
            "'{}' resolved to no addresses",
            host
        )));
    }

    for addr in addrs {
        if !ip_is_public(addr.ip()) {
            return Err(TapMapError::UnsafeTarget(format!(
                "'{}' resolves to non-public address {}",
                host,
                addr.ip()
            )));
        }
    }

    Ok(())
}

fn check_literal(ip: IpAddr) -> Result<(), TapMapError> {
    if ip_is_public(ip) {
        Ok(())
    } else {
        Err(TapMapError::UnsafeTarget(format!(
            "{} is not a public address",
            ip
        )))
    }
}

/// Returns true for addresses that are plausibly on the public internet
fn ip_is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            let unique_local = (segments[0] & 0xfe00) == 0xfc00;
            let link_local = (segments[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_host_matches() {
        let key = DomainKey::from_url("https://example.com/").unwrap();
        assert!(key.matches("https://example.com/other/page"));
    }

    #[test]
    fn test_subdomain_does_not_match() {
        let key = DomainKey::from_url("https://example.com/").unwrap();
        assert!(!key.matches("https://blog.example.com/post"));
    }

    #[test]
    fn test_scheme_is_ignored() {
        let key = DomainKey::from_url("https://example.com/").unwrap();
        assert!(key.matches("http://example.com/legacy"));
    }

    #[test]
    fn test_explicit_port_is_significant() {
        let key = DomainKey::from_url("http://example.com:8080/").unwrap();
        assert!(key.matches("http://example.com:8080/admin"));
        assert!(!key.matches("http://example.com/admin"));
    }

    #[test]
    fn test_host_case_insensitive() {
        let key = DomainKey::from_url("https://EXAMPLE.com/").unwrap();
        assert!(key.matches("https://example.COM/page"));
    }

    #[test]
    fn test_garbage_never_matches() {
        let key = DomainKey::from_url("https://example.com/").unwrap();
        assert!(!key.matches("not a url"));
        assert!(!key.matches("mailto:user@example.com"));
    }

    #[tokio::test]
    async fn test_rejects_loopback_literal() {
        assert!(ensure_public_target("http://127.0.0.1:8080/").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_localhost() {
        assert!(ensure_public_target("http://localhost/").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_private_ranges() {
        assert!(ensure_public_target("http://10.0.0.5/").await.is_err());
        assert!(ensure_public_target("http://192.168.1.1/").await.is_err());
        assert!(ensure_public_target("http://172.16.0.1/").await.is_err());
        assert!(ensure_public_target("http://169.254.1.1/").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_ipv6_loopback() {
        assert!(ensure_public_target("http://[::1]/").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        assert!(ensure_public_target("file:///etc/passwd").await.is_err());
        assert!(ensure_public_target("gopher://example.com/").await.is_err());
    }

    #[tokio::test]
    async fn test_accepts_public_literal() {
        assert!(ensure_public_target("https://93.184.216.34/").await.is_ok());
    }
}
