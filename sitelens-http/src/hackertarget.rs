//! HackerTarget HTTP header dump (`api.hackertarget.com/httpheaders`).

use async_trait::async_trait;
use reqwest::Client;
use sitelens_core::{LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse};
use url::Url;

use crate::client::get_text;
use crate::headers::headers_record;

/// Public endpoint.
pub const ENDPOINT: &str = "https://api.hackertarget.com/httpheaders/";

/// Headers provider backed by HackerTarget's free header dump.
#[derive(Debug, Clone)]
pub struct HackerTargetProvider {
    endpoint: String,
    client: Client,
}

impl HackerTargetProvider {
    /// Provider name.
    pub const NAME: &'static str = "hackertarget";

    /// Provider using the public endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
            client,
        }
    }

    /// Point this provider at another endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Split a header dump into `(name, value)` pairs of the final response.
///
/// Redirects produce several status blocks; only the last one describes the
/// page that was actually served.
#[must_use]
pub fn parse_header_dump(text: &str) -> Vec<(String, String)> {
    let mut blocks: Vec<Vec<(String, String)>> = vec![Vec::new()];
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            if blocks.last().is_some_and(|b| !b.is_empty()) {
                blocks.push(Vec::new());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':')
            && !name.is_empty()
            && !name.contains(' ')
            && let Some(block) = blocks.last_mut()
        {
            block.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    blocks.pop().unwrap_or_default()
}

fn is_api_error(text: &str) -> bool {
    let lower = text.trim_start().to_ascii_lowercase();
    lower.starts_with("error") || lower.contains("api count exceeded")
}

#[async_trait]
impl LensProvider for HackerTargetProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "HackerTarget"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Headers
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut().append_pair("q", query.host());
        let body = get_text(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Text(body))
    }

    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let text = raw.into_text(Self::NAME)?;
        if is_api_error(&text) {
            let first = text.lines().next().unwrap_or_default().trim().to_string();
            return Err(LensError::provider(Self::NAME, first));
        }
        let headers = parse_header_dump(&text);
        if headers.is_empty() {
            return Err(LensError::empty(Self::NAME, "http headers"));
        }
        headers_record(&headers, query.host())
    }
}
