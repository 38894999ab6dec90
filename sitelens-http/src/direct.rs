//! Direct requests to the analyzed site.
//!
//! One GET answers three kinds: the status and timing give `Reachability`,
//! the response headers give `Headers`, and the HTML body gives `Seo`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use sitelens_core::{
    Field, FieldValue, LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse,
};

use crate::client::{MAX_BODY_BYTES, transport_err};
use crate::headers::headers_record;

/// Provider that talks to the target itself.
#[derive(Debug, Clone)]
pub struct DirectProvider {
    client: Client,
}

impl DirectProvider {
    /// Provider name.
    pub const NAME: &'static str = "direct";

    /// Provider sharing `client`.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

async fn read_body(mut resp: Response) -> Result<String, LensError> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = resp
        .chunk()
        .await
        .map_err(|e| transport_err(DirectProvider::NAME, &e))?
    {
        let room = MAX_BODY_BYTES.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buf.len() >= MAX_BODY_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn selector(css: &str) -> Result<Selector, LensError> {
    Selector::parse(css)
        .map_err(|e| LensError::normalization(DirectProvider::NAME, format!("{css}: {e:?}")))
}

fn count(doc: &Html, css: &str) -> Result<u64, LensError> {
    let n = doc.select(&selector(css)?).count();
    Ok(u64::try_from(n).unwrap_or(u64::MAX))
}

/// Build a `Seo` record from an HTML document.
///
/// Counts are always determined for a parsed document (zero is an answer);
/// title and description stay `Unknown` when the page has none.
///
/// # Errors
/// `Normalization` if a built-in selector fails to compile.
pub fn seo_record(html: &str) -> Result<NormalizedRecord, LensError> {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&selector("title")?)
        .next()
        .map(|t| t.text().collect::<String>());
    let description = doc
        .select(&selector(r#"meta[name="description"]"#)?)
        .find_map(|m| m.value().attr("content"));
    let viewport = doc
        .select(&selector(r#"meta[name="viewport"]"#)?)
        .any(|m| {
            m.value()
                .attr("content")
                .is_some_and(|c| c.contains("width=device-width"))
        });

    NormalizedRecord::unknown(QueryKind::Seo)
        .with(Field::PageTitle, FieldValue::opt_text(title))?
        .with(Field::MetaDescription, FieldValue::opt_text(description))?
        .with(Field::H1Count, count(&doc, "h1")?)?
        .with(Field::ImageCount, count(&doc, "img")?)?
        .with(Field::LinkCount, count(&doc, "a[href]")?)?
        .with(Field::MobileOptimized, viewport)
}

fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    content_type.is_some_and(|ct| ct.contains("html"))
        || body.trim_start().starts_with('<')
}

#[async_trait]
impl LensProvider for DirectProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Direct"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        matches!(
            kind,
            QueryKind::Reachability | QueryKind::Headers | QueryKind::Seo
        )
    }

    fn validates_target_tls(&self) -> bool {
        true
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(provider = Self::NAME, url = %query.target, "GET");
        let started = Instant::now();
        let resp = self
            .client
            .get(query.target.url().clone())
            .send()
            .await
            .map_err(|e| transport_err(Self::NAME, &e))?;
        let elapsed = started.elapsed();

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = if query.kind == QueryKind::Seo {
            Some(read_body(resp).await?)
        } else {
            None
        };
        Ok(RawResponse::Http {
            status,
            elapsed,
            headers,
            body,
        })
    }

    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let content_type = raw.header("content-type").map(str::to_ascii_lowercase);
        let (status, elapsed, headers, body) = match raw {
            RawResponse::Http {
                status,
                elapsed,
                headers,
                body,
            } => (status, elapsed, headers, body),
            other => {
                return Err(LensError::malformed(
                    Self::NAME,
                    format!("expected http payload, got {}", other.shape()),
                ));
            }
        };

        match query.kind {
            QueryKind::Reachability => {
                let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                NormalizedRecord::unknown(QueryKind::Reachability)
                    .with(Field::Accessible, true)?
                    .with(Field::ResponseCode, u64::from(status))?
                    .with(Field::ResponseTime, FieldValue::Millis(millis))
            }
            QueryKind::Headers => headers_record(&headers, query.host()),
            QueryKind::Seo => {
                let body =
                    body.ok_or_else(|| LensError::malformed(Self::NAME, "response body missing"))?;
                if !(200..300).contains(&status) {
                    return Err(LensError::empty(
                        Self::NAME,
                        format!("html document (HTTP {status})"),
                    ));
                }
                if !looks_like_html(content_type.as_deref(), &body) {
                    return Err(LensError::empty(Self::NAME, "html document"));
                }
                seo_record(&body)
            }
            other => Err(LensError::unsupported(other.as_str())),
        }
    }
}
