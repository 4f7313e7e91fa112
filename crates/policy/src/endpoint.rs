//! Network endpoints extracted from configured URLs.

use serde::Serialize;
use std::fmt;
use url::Url;

/// A `(host, port)` pair a socket grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Extract the host and port from a URL such as `https://auth.example.com`.
    ///
    /// The port falls back to the scheme's well-known port when the URL
    /// does not name one. Returns a human-readable reason on failure.
    pub fn from_url(value: &str) -> std::result::Result<Self, String> {
        let url = Url::parse(value.trim()).map_err(|e| e.to_string())?;

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err("URL has no host".to_string()),
        };

        let port = url
            .port_or_known_default()
            .ok_or_else(|| format!("no port given and none known for scheme '{}'", url.scheme()))?;

        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether two endpoints name the same socket. Host names compare
    /// ASCII case-insensitively.
    pub fn matches(&self, other: &Endpoint) -> bool {
        self.port == other.port && self.host.eq_ignore_ascii_case(&other.host)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
