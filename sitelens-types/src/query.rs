use core::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::{LensError, QueryKind};

/// A validated website address to analyze.
///
/// Only absolute `http`/`https` URLs with a host are accepted. The host is
/// stored lowercased and without a trailing dot so providers can use it as a
/// DNS name directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Target {
    url: Url,
    host: String,
}

impl Target {
    /// Parse and validate user input.
    ///
    /// # Errors
    /// Returns `InvalidArg` for blank input, unparseable URLs, schemes other
    /// than `http`/`https`, and URLs without a host.
    pub fn parse(input: &str) -> Result<Self, LensError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LensError::InvalidArg("url must not be empty".into()));
        }
        let url = Url::parse(trimmed)?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(LensError::InvalidArg(format!(
                    "unsupported scheme '{other}': only http and https are accepted"
                )));
            }
        }
        let host = match url.host() {
            Some(Host::Domain(d)) => d.trim_end_matches('.').to_ascii_lowercase(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(LensError::InvalidArg(format!("url has no host: {trimmed}")));
        }
        Ok(Self { url, host })
    }

    /// The full parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Hostname (lowercase, no trailing dot) or IP literal.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the scheme is `https`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Explicit port, or the scheme's default.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.url
            .port_or_known_default()
            .unwrap_or(if self.is_https() { 443 } else { 80 })
    }

    /// `"HTTPS"` or `"HTTP"`.
    #[must_use]
    pub fn protocol(&self) -> &'static str {
        if self.is_https() { "HTTPS" } else { "HTTP" }
    }

    /// The host as an address when the URL names an IP literal.
    #[must_use]
    pub fn host_ip(&self) -> Option<IpAddr> {
        match self.url.host()? {
            Host::Ipv4(ip) => Some(IpAddr::V4(ip)),
            Host::Ipv6(ip) => Some(IpAddr::V6(ip)),
            Host::Domain(_) => None,
        }
    }

    /// Build a query of `kind` against this target.
    #[must_use]
    pub fn query(&self, kind: QueryKind) -> Query {
        Query {
            kind,
            target: self.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl From<Target> for String {
    fn from(t: Target) -> Self {
        t.url.into()
    }
}

impl TryFrom<String> for Target {
    type Error = LensError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl core::str::FromStr for Target {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One lookup request: the target plus the kind of lookup to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Kind of lookup.
    pub kind: QueryKind,
    /// Website the lookup is about.
    pub target: Target,
}

impl Query {
    /// Build a query.
    #[must_use]
    pub const fn new(kind: QueryKind, target: Target) -> Self {
        Self { kind, target }
    }

    /// Shorthand for `self.target.host()`.
    #[must_use]
    pub fn host(&self) -> &str {
        self.target.host()
    }
}
