//! Third-party page metadata APIs for the `Seo` kind.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sitelens_core::{
    Field, FieldValue, LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse,
};
use url::Url;

use crate::client::{get_json, url_with_segments};

/// Google PageSpeed Insights v5 endpoint.
pub const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
/// LinkPreview endpoint.
pub const LINKPREVIEW_ENDPOINT: &str = "https://api.linkpreview.net/";
/// OpenGraph.io site endpoint; the encoded URL is appended as a path segment.
pub const OPENGRAPH_ENDPOINT: &str = "https://opengraph.io/api/1.1/site";

/// Key used when none is configured; the services accept it with tight quotas.
pub const DEMO_KEY: &str = "demo";

/// Credentials for the keyed metadata APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeys {
    /// LinkPreview API key.
    pub linkpreview: String,
    /// OpenGraph.io app id.
    pub opengraph: String,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            linkpreview: DEMO_KEY.to_string(),
            opengraph: DEMO_KEY.to_string(),
        }
    }
}

fn text_at<'a>(doc: &'a Value, pointer: &str) -> Option<&'a str> {
    doc.pointer(pointer).and_then(Value::as_str)
}

fn provider_error(provider: &str, doc: &Value) -> Option<LensError> {
    let err = doc.get("error")?;
    let msg = match err {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) => s.clone(),
        Value::Object(o) => o
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| err.to_string(), str::to_string),
        other => doc
            .get("description")
            .and_then(Value::as_str)
            .map_or_else(|| format!("error {other}"), str::to_string),
    };
    Some(LensError::provider(provider, msg))
}

/// SEO provider backed by Google PageSpeed Insights (Lighthouse audits).
#[derive(Debug, Clone)]
pub struct PageSpeedProvider {
    endpoint: String,
    client: Client,
}

impl PageSpeedProvider {
    /// Provider name.
    pub const NAME: &'static str = "pagespeed";

    /// Provider using the public endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            endpoint: PAGESPEED_ENDPOINT.to_string(),
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

fn audit_items(audits: &Value, id: &str) -> FieldValue {
    audits
        .pointer(&format!("/{id}/details/items"))
        .and_then(Value::as_array)
        .map_or(FieldValue::Unknown, |items| {
            FieldValue::Count(u64::try_from(items.len()).unwrap_or(u64::MAX))
        })
}

#[async_trait]
impl LensProvider for PageSpeedProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Google"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Seo
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("url", query.target.url().as_str())
            .append_pair("strategy", "desktop");
        let doc: Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, _query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let doc = raw.into_json(Self::NAME)?;
        if let Some(e) = provider_error(Self::NAME, &doc) {
            return Err(e);
        }
        let audits = doc
            .pointer("/lighthouseResult/audits")
            .ok_or_else(|| LensError::malformed(Self::NAME, "missing lighthouseResult.audits"))?;

        let mobile = match audits.pointer("/viewport/score").and_then(Value::as_f64) {
            Some(score) => FieldValue::Flag((score - 1.0).abs() < f64::EPSILON),
            None => FieldValue::Unknown,
        };

        NormalizedRecord::unknown(QueryKind::Seo)
            .with(
                Field::PageTitle,
                FieldValue::opt_text(text_at(audits, "/document-title/details/items/0/text")),
            )?
            .with(
                Field::MetaDescription,
                FieldValue::opt_text(text_at(
                    audits,
                    "/meta-description/details/items/0/description",
                )),
            )?
            .with(Field::H1Count, audit_items(audits, "heading-order"))?
            .with(Field::ImageCount, audit_items(audits, "image-alt"))?
            .with(Field::LinkCount, audit_items(audits, "link-text"))?
            .with(Field::MobileOptimized, mobile)
    }
}

/// SEO provider backed by LinkPreview (title and description only).
#[derive(Debug, Clone)]
pub struct LinkPreviewProvider {
    endpoint: String,
    key: String,
    client: Client,
}

impl LinkPreviewProvider {
    /// Provider name.
    pub const NAME: &'static str = "linkpreview";

    /// Provider using the public endpoint and `key`.
    #[must_use]
    pub fn new(client: Client, key: impl Into<String>) -> Self {
        Self {
            endpoint: LINKPREVIEW_ENDPOINT.to_string(),
            key: key.into(),
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

#[async_trait]
impl LensProvider for LinkPreviewProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "LinkPreview"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Seo
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("key", &self.key)
            .append_pair("q", query.target.url().as_str());
        let doc: Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, _query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let doc = raw.into_json(Self::NAME)?;
        if let Some(e) = provider_error(Self::NAME, &doc) {
            return Err(e);
        }
        if !doc.is_object() {
            return Err(LensError::malformed(Self::NAME, "expected a JSON object"));
        }
        NormalizedRecord::unknown(QueryKind::Seo)
            .with(Field::PageTitle, FieldValue::opt_text(text_at(&doc, "/title")))?
            .with(
                Field::MetaDescription,
                FieldValue::opt_text(text_at(&doc, "/description")),
            )
    }
}

/// SEO provider backed by OpenGraph.io's hybrid graph.
#[derive(Debug, Clone)]
pub struct OpenGraphProvider {
    endpoint: String,
    app_id: String,
    client: Client,
}

impl OpenGraphProvider {
    /// Provider name.
    pub const NAME: &'static str = "opengraph";

    /// Provider using the public endpoint and `app_id`.
    #[must_use]
    pub fn new(client: Client, app_id: impl Into<String>) -> Self {
        Self {
            endpoint: OPENGRAPH_ENDPOINT.to_string(),
            app_id: app_id.into(),
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

#[async_trait]
impl LensProvider for OpenGraphProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "OpenGraph.io"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Seo
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let mut url = url_with_segments(&self.endpoint, &[query.target.url().as_str()])?;
        url.query_pairs_mut().append_pair("app_id", &self.app_id);
        let doc: Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, _query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let doc = raw.into_json(Self::NAME)?;
        if let Some(e) = provider_error(Self::NAME, &doc) {
            return Err(e);
        }
        let graph = doc
            .get("hybridGraph")
            .ok_or_else(|| LensError::malformed(Self::NAME, "missing hybridGraph"))?;
        NormalizedRecord::unknown(QueryKind::Seo)
            .with(Field::PageTitle, FieldValue::opt_text(text_at(graph, "/title")))?
            .with(
                Field::MetaDescription,
                FieldValue::opt_text(text_at(graph, "/description")),
            )
    }
}
