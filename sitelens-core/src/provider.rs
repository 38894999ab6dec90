use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use sitelens_types::{LensError, NormalizedRecord, ProviderKey, Query, QueryKind};

/// Undecoded payload returned by [`LensProvider::fetch`].
///
/// Fetching and normalizing are separate steps so that shape knowledge stays
/// in each provider's `normalize`, and the resolver can treat every provider
/// the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// A JSON document.
    Json(Value),
    /// A plain-text body.
    Text(String),
    /// A direct HTTP exchange with the target itself.
    Http {
        /// Response status code.
        status: u16,
        /// Time from request start to response headers.
        elapsed: Duration,
        /// Response headers, names lowercased.
        headers: Vec<(String, String)>,
        /// Response body, when it was read.
        body: Option<String>,
    },
    /// An already-normalized record (stubs and composite providers).
    Record(NormalizedRecord),
}

impl RawResponse {
    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Http { .. } => "http",
            Self::Record(_) => "record",
        }
    }

    /// Take the JSON document, or fail as a malformed response of `provider`.
    ///
    /// # Errors
    /// Returns `MalformedResponse` when the payload is not JSON.
    pub fn into_json(self, provider: &str) -> Result<Value, LensError> {
        match self {
            Self::Json(v) => Ok(v),
            other => Err(unexpected(provider, "json", &other)),
        }
    }

    /// Take the text body, or fail as a malformed response of `provider`.
    ///
    /// # Errors
    /// Returns `MalformedResponse` when the payload is not text.
    pub fn into_text(self, provider: &str) -> Result<String, LensError> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(unexpected(provider, "text", &other)),
        }
    }

    /// Case-insensitive header lookup on an `Http` payload.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::Http { headers, .. } => headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

fn unexpected(provider: &str, wanted: &str, got: &RawResponse) -> LensError {
    LensError::malformed(
        provider,
        format!("expected {wanted} payload, got {}", got.shape()),
    )
}

/// One external data source for one or more query kinds.
///
/// Implementors declare the kinds they serve via [`supports_kind`](Self::supports_kind),
/// fetch a raw payload, and map it onto the fixed record shape of the queried
/// kind. The resolver applies timeouts, rejects uninformative records and
/// handles fallback, so providers only report what they saw.
#[async_trait]
pub trait LensProvider: Send + Sync {
    /// A stable identifier used in priority lists and results (e.g. "doh-google").
    fn name(&self) -> &'static str;

    /// Canonical provider key constructed from the static name.
    fn key(&self) -> ProviderKey {
        ProviderKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this provider serves the given query kind.
    ///
    /// Default: `false` for all kinds. Providers must opt in explicitly.
    fn supports_kind(&self, kind: QueryKind) -> bool {
        let _ = kind;
        false
    }

    /// Provider-specific timeout overriding the orchestrator default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Whether a `Reachability` answer from this provider implies a
    /// certificate-validated TLS handshake with the target itself.
    ///
    /// Default: `false`. Proxies and third-party services must not claim it.
    fn validates_target_tls(&self) -> bool {
        false
    }

    /// Perform the network call for `query`.
    ///
    /// # Errors
    /// Connection failures, non-success statuses, undecodable bodies and
    /// provider-reported errors.
    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError>;

    /// Map `raw` onto a record of `query.kind`.
    ///
    /// Fields the payload does not determine stay `Unknown`. Returning a record
    /// with no known field is allowed; the resolver treats it as an empty result.
    ///
    /// # Errors
    /// Payloads of the wrong shape, provider error documents, or values that
    /// cannot be interpreted.
    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError>;
}
