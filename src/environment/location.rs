//! Current page location.
//!
//! The page URL drives two decisions: whether a background worker may be
//! registered at all (secure origin or allow-listed host), and which tunnel
//! endpoint the transport connects to.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// PageLocation
// ============================================================================

/// URL of the page hosting the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Wraps an already parsed URL.
    #[inline]
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parses a page URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `input` is not an absolute URL.
    pub fn parse(input: &str) -> Result<Self> {
        Url::parse(input)
            .map(Self::new)
            .map_err(|e| Error::invalid_url(input, e))
    }

    /// Returns the full page URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns `true` if the page is served over `https`.
    #[inline]
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Returns the hostname without port.
    #[inline]
    #[must_use]
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    /// Returns `host[:port]` as the page would report it.
    #[must_use]
    pub fn host(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{}", self.hostname(), port),
            None => self.hostname().to_string(),
        }
    }

    /// Returns `true` if worker registration is permitted from this page.
    ///
    /// Secure pages always pass. Insecure pages pass only when the hostname
    /// is in `allowed_hosts`.
    #[must_use]
    pub fn permits_workers<S: AsRef<str>>(&self, allowed_hosts: &[S]) -> bool {
        self.is_secure()
            || allowed_hosts
                .iter()
                .any(|host| host.as_ref() == self.hostname())
    }

    /// Builds the tunnel endpoint for this origin.
    ///
    /// `wss` on secure pages, `ws` otherwise, e.g. `wss://host:8443/wisp/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the page has no host.
    pub fn tunnel_endpoint(&self, path: &str) -> Result<Url> {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        let raw = format!("{}://{}{}", scheme, self.host(), path);
        Url::parse(&raw).map_err(|e| Error::invalid_url(raw, e))
    }
}

impl FromStr for PageLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["localhost", "127.0.0.1"];

    #[test]
    fn test_secure_page_permits_workers() {
        let page = PageLocation::parse("https://proxy.example.com/").unwrap();
        assert!(page.is_secure());
        assert!(page.permits_workers(ALLOWED));
    }

    #[test]
    fn test_loopback_http_permits_workers() {
        let page = PageLocation::parse("http://localhost:8080/").unwrap();
        assert!(!page.is_secure());
        assert!(page.permits_workers(ALLOWED));

        let page = PageLocation::parse("http://127.0.0.1:8080/").unwrap();
        assert!(page.permits_workers(ALLOWED));
    }

    #[test]
    fn test_insecure_remote_rejected() {
        let page = PageLocation::parse("http://proxy.example.com/").unwrap();
        assert!(!page.permits_workers(ALLOWED));
    }

    #[test]
    fn test_tunnel_endpoint_secure() {
        let page = PageLocation::parse("https://proxy.example.com/search").unwrap();
        let endpoint = page.tunnel_endpoint("/wisp/").unwrap();
        assert_eq!(endpoint.as_str(), "wss://proxy.example.com/wisp/");
    }

    #[test]
    fn test_tunnel_endpoint_keeps_port() {
        let page = PageLocation::parse("http://localhost:8080/").unwrap();
        let endpoint = page.tunnel_endpoint("/wisp/").unwrap();
        assert_eq!(endpoint.as_str(), "ws://localhost:8080/wisp/");
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert!(matches!(
            PageLocation::parse("/relative"),
            Err(Error::InvalidUrl { .. })
        ));
    }
}
