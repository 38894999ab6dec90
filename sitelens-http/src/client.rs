//! Shared HTTP plumbing: client construction and error mapping.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use sitelens_core::LensError;
use url::Url;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("sitelens/", env!("CARGO_PKG_VERSION"));

/// Upper bound on bodies read from the analyzed site.
pub(crate) const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build the client shared by all providers.
///
/// No overall request timeout is set here; the resolver bounds every
/// provider call itself.
///
/// # Errors
/// Returns `Other` if the TLS backend cannot be initialized.
pub fn default_client() -> Result<Client, LensError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| LensError::Other(format!("failed to build http client: {e}")))
}

pub(crate) fn transport_err(provider: &str, e: &reqwest::Error) -> LensError {
    if e.is_decode() {
        LensError::malformed(provider, e.to_string())
    } else {
        LensError::network(provider, e.to_string())
    }
}

/// Reject non-success statuses. Rate limiting is reported by the provider
/// itself rather than the network.
pub(crate) fn check_status(provider: &str, resp: Response) -> Result<Response, LensError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LensError::provider(provider, "rate limited (HTTP 429)"));
    }
    if !status.is_success() {
        return Err(LensError::network(provider, format!("HTTP {status}")));
    }
    Ok(resp)
}

pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: Url,
    accept: Option<&str>,
) -> Result<String, LensError> {
    #[cfg(feature = "tracing")]
    tracing::debug!(provider, url = %url, "GET");
    let mut req = client.get(url);
    if let Some(accept) = accept {
        req = req.header(reqwest::header::ACCEPT, accept);
    }
    let resp = req.send().await.map_err(|e| transport_err(provider, &e))?;
    let resp = check_status(provider, resp)?;
    resp.text().await.map_err(|e| transport_err(provider, &e))
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: Url,
    accept: Option<&str>,
) -> Result<T, LensError> {
    let body = get_text(client, provider, url, accept).await?;
    parse_json(provider, &body)
}

pub(crate) fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, LensError> {
    serde_json::from_str(body).map_err(|e| LensError::malformed(provider, e.to_string()))
}

/// `endpoint` with `segments` appended to its path, each percent-encoded.
pub(crate) fn url_with_segments(endpoint: &str, segments: &[&str]) -> Result<Url, LensError> {
    let mut url = Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|()| LensError::InvalidArg(format!("endpoint cannot take a path: {endpoint}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
