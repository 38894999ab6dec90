//! IP geolocation providers for the `Hosting` kind.
//!
//! Both services are keyed by IP address, so each provider first resolves the
//! target host through its own DNS-over-HTTPS resolver. That keeps `Hosting`
//! independent of the `Dns` kind's outcome.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sitelens_core::{
    Field, FieldValue, LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse,
};

use crate::client::{get_json, url_with_segments};
use crate::doh::DohProvider;
use crate::headers::platform_for_host;

/// ipapi.co endpoint; the address and `json/` are appended as path segments.
pub const IPAPI_CO_ENDPOINT: &str = "https://ipapi.co/";
/// ip-api.com endpoint; the address is appended as a path segment.
pub const IP_API_COM_ENDPOINT: &str = "http://ip-api.com/json/";

const IP_API_COM_FIELDS: &str =
    "status,message,country,countryCode,regionName,city,org,as,isp,timezone,query";

const NETWORK_OWNERS: [(&str, &str); 9] = [
    ("AMAZON", "Amazon Web Services (AWS)"),
    ("GOOGLE", "Google Cloud Platform"),
    ("MICROSOFT", "Microsoft Azure"),
    ("CLOUDFLARE", "Cloudflare"),
    ("DIGITALOCEAN", "DigitalOcean"),
    ("LINODE", "Linode"),
    ("VULTR", "Vultr"),
    ("HETZNER", "Hetzner"),
    ("OVH", "OVH"),
];

/// Hosting provider name from the network owner, falling back to well-known
/// hosting domains and then the raw owner string.
#[must_use]
pub fn classify_hosting(org: Option<&str>, host: &str) -> Option<String> {
    if let Some(org) = org {
        let upper = org.to_ascii_uppercase();
        if let Some((_, name)) = NETWORK_OWNERS.iter().find(|(k, _)| upper.contains(k)) {
            return Some((*name).to_string());
        }
    }
    if let Some((platform, _)) = platform_for_host(host) {
        return Some(platform.to_string());
    }
    org.map(str::to_string)
}

/// Provider-independent view of a geolocation answer.
#[derive(Debug, Default)]
struct GeoFields {
    org: Option<String>,
    isp: Option<String>,
    asn: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
}

impl GeoFields {
    fn into_record(self, host: &str) -> Result<NormalizedRecord, LensError> {
        let location: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let location = (!location.is_empty()).then(|| location.join(", "));
        let hosting = classify_hosting(self.org.as_deref().or(self.isp.as_deref()), host);

        NormalizedRecord::unknown(QueryKind::Hosting)
            .with(Field::HostingProvider, FieldValue::opt_text(hosting))?
            .with(Field::ServerLocation, FieldValue::opt_text(location))?
            .with(Field::Asn, FieldValue::opt_text(self.asn))?
            .with(Field::Isp, FieldValue::opt_text(self.isp.or(self.org)))?
            .with(Field::Timezone, FieldValue::opt_text(self.timezone))?
            .with(Field::CountryCode, FieldValue::opt_text(self.country_code))
    }
}

async fn target_ip(resolver: &DohProvider, query: &Query) -> Result<IpAddr, LensError> {
    match query.target.host_ip() {
        Some(ip) => Ok(ip),
        None => resolver.resolve_ip(query.host()).await,
    }
}

/// `ipapi.co` JSON document.
#[derive(Debug, Deserialize)]
struct IpapiCoReply {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
    asn: Option<String>,
    org: Option<String>,
}

/// Hosting provider backed by ipapi.co.
#[derive(Debug, Clone)]
pub struct IpapiCoProvider {
    endpoint: String,
    client: Client,
    resolver: Arc<DohProvider>,
}

impl IpapiCoProvider {
    /// Provider name.
    pub const NAME: &'static str = "ipapi-co";

    /// Provider using the public endpoint; `resolver` maps hosts to addresses.
    #[must_use]
    pub fn new(client: Client, resolver: Arc<DohProvider>) -> Self {
        Self {
            endpoint: IPAPI_CO_ENDPOINT.to_string(),
            client,
            resolver,
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
impl LensProvider for IpapiCoProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "ipapi.co"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Hosting
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let ip = target_ip(&self.resolver, query).await?;
        let ip = ip.to_string();
        let url = url_with_segments(&self.endpoint, &[&ip, "json", ""])?;
        let doc: serde_json::Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let reply: IpapiCoReply = serde_json::from_value(raw.into_json(Self::NAME)?)
            .map_err(|e| LensError::malformed(Self::NAME, e.to_string()))?;
        if reply.error {
            let reason = reply.reason.unwrap_or_else(|| "unspecified error".into());
            return Err(LensError::provider(Self::NAME, reason));
        }
        GeoFields {
            isp: reply.org.clone(),
            org: reply.org,
            asn: reply.asn,
            city: reply.city,
            region: reply.region,
            country: reply.country_name,
            country_code: reply.country_code,
            timezone: reply.timezone,
        }
        .into_record(query.host())
    }
}

/// `ip-api.com` JSON document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComReply {
    status: String,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    asn: Option<String>,
    isp: Option<String>,
    timezone: Option<String>,
}

/// Hosting provider backed by ip-api.com.
#[derive(Debug, Clone)]
pub struct IpApiComProvider {
    endpoint: String,
    client: Client,
    resolver: Arc<DohProvider>,
}

impl IpApiComProvider {
    /// Provider name.
    pub const NAME: &'static str = "ip-api-com";

    /// Provider using the public endpoint; `resolver` maps hosts to addresses.
    #[must_use]
    pub fn new(client: Client, resolver: Arc<DohProvider>) -> Self {
        Self {
            endpoint: IP_API_COM_ENDPOINT.to_string(),
            client,
            resolver,
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
impl LensProvider for IpApiComProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "ip-api.com"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Hosting
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let ip = target_ip(&self.resolver, query).await?;
        let mut url = url_with_segments(&self.endpoint, &[&ip.to_string()])?;
        url.query_pairs_mut()
            .append_pair("fields", IP_API_COM_FIELDS);
        let doc: serde_json::Value = get_json(&self.client, Self::NAME, url, None).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let reply: IpApiComReply = serde_json::from_value(raw.into_json(Self::NAME)?)
            .map_err(|e| LensError::malformed(Self::NAME, e.to_string()))?;
        if reply.status != "success" {
            let msg = reply.message.unwrap_or_else(|| reply.status.clone());
            return Err(LensError::provider(Self::NAME, msg));
        }
        GeoFields {
            org: reply.org,
            isp: reply.isp,
            asn: reply.asn,
            city: reply.city,
            region: reply.region_name,
            country: reply.country,
            country_code: reply.country_code,
            timezone: reply.timezone,
        }
        .into_record(query.host())
    }
}
