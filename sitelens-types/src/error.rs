use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the sitelens workspace.
///
/// The first four provider-side variants (`Network`, `ProviderTimeout`,
/// `MalformedResponse`, `EmptyResult`) are always recovered inside the resolver
/// by advancing to the next provider. Only input validation (`InvalidArg`) and
/// builder misconfiguration are expected to reach callers.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LensError {
    /// The request to a provider could not complete (connect, TLS, HTTP status).
    #[error("{provider} network error: {msg}")]
    Network {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual provider call exceeded its timeout.
    #[error("provider timed out: {kind} via {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
        /// Query kind label (e.g. "dns", "hosting").
        kind: String,
    },

    /// A response was received but could not be parsed into the expected shape.
    #[error("{provider} returned a malformed response: {msg}")]
    MalformedResponse {
        /// Provider name that returned the response.
        provider: String,
        /// What was wrong with the payload.
        msg: String,
    },

    /// A structurally valid but uninformative response (e.g. zero DNS answers).
    #[error("{provider} returned no usable data for {what}")]
    EmptyResult {
        /// Provider name that returned the empty response.
        provider: String,
        /// Description of the missing data, e.g. "dns A records".
        what: String,
    },

    /// A provider's normalization step rejected the raw response.
    #[error("{provider} normalization failed: {msg}")]
    Normalization {
        /// Provider name whose normalization failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A provider reported an error of its own (rate limiting, API error payload).
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The requested query kind is not served by the target provider(s).
    #[error("unsupported query kind: {kind}")]
    Unsupported {
        /// Query kind label that was requested.
        kind: String,
    },

    /// Invalid input argument (malformed URL, empty provider set, ...).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The overall aggregate deadline expired before this kind settled.
    #[error("request timed out: {kind}")]
    RequestTimeout {
        /// Query kind label that did not settle in time.
        kind: String,
    },

    /// All attempted providers failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<LensError>),

    /// All attempted providers timed out for the requested kind.
    #[error("all providers timed out: {kind}")]
    AllProvidersTimedOut {
        /// Query kind label that timed out across all providers.
        kind: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl LensError {
    /// Helper: build a `Network` error.
    pub fn network(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            kind: kind.into(),
        }
    }

    /// Helper: build a `MalformedResponse` error.
    pub fn malformed(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `EmptyResult` error.
    pub fn empty(provider: impl Into<String>, what: impl Into<String>) -> Self {
        Self::EmptyResult {
            provider: provider.into(),
            what: what.into(),
        }
    }

    /// Helper: build a `Normalization` error.
    pub fn normalization(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Normalization {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Provider` error.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a query kind label.
    #[must_use]
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::Unsupported { kind: kind.into() }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(kind: impl Into<String>) -> Self {
        Self::RequestTimeout { kind: kind.into() }
    }

    /// True for structurally valid but uninformative responses.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }

    /// True for failures a resolver recovers from by trying the next provider.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::ProviderTimeout { .. }
                | Self::MalformedResponse { .. }
                | Self::EmptyResult { .. }
                | Self::Normalization { .. }
                | Self::Provider { .. }
        )
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

impl From<url::ParseError> for LensError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidArg(format!("invalid url: {e}"))
    }
}
