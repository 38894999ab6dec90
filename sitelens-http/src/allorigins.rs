//! AllOrigins proxy probe (`api.allorigins.win/get`).
//!
//! The proxy fetches the site on our behalf and reports the status it saw,
//! which still answers "is the site up" when direct requests are blocked.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sitelens_core::{
    Field, FieldValue, LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse,
};
use url::Url;

use crate::client::get_json;

/// Public endpoint.
pub const ENDPOINT: &str = "https://api.allorigins.win/get";

/// Reachability provider backed by the AllOrigins proxy.
#[derive(Debug, Clone)]
pub struct AllOriginsProvider {
    endpoint: String,
    client: Client,
}

impl AllOriginsProvider {
    /// Provider name.
    pub const NAME: &'static str = "allorigins";

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

#[derive(Debug, Deserialize)]
struct ProxyReply {
    status: Option<ProxyStatus>,
}

#[derive(Debug, Deserialize)]
struct ProxyStatus {
    #[serde(default)]
    http_code: Option<u64>,
    #[serde(default)]
    response_time: Option<u64>,
}

#[async_trait]
impl LensProvider for AllOriginsProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "AllOrigins"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Reachability
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("url", query.target.url().as_str());
        let doc: serde_json::Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, _query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let reply: ProxyReply = serde_json::from_value(raw.into_json(Self::NAME)?)
            .map_err(|e| LensError::malformed(Self::NAME, e.to_string()))?;
        let status = reply
            .status
            .ok_or_else(|| LensError::malformed(Self::NAME, "missing status object"))?;
        // the proxy reports 0 or nothing when it could not reach the site
        let code = status
            .http_code
            .filter(|c| *c > 0)
            .ok_or_else(|| LensError::empty(Self::NAME, "proxied http status"))?;

        NormalizedRecord::unknown(QueryKind::Reachability)
            .with(Field::Accessible, true)?
            .with(Field::ResponseCode, code)?
            .with(
                Field::ResponseTime,
                status
                    .response_time
                    .map_or(FieldValue::Unknown, FieldValue::Millis),
            )
    }
}
