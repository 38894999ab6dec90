//! DNS-over-HTTPS providers using the JSON DNS API
//! (`Accept: application/dns-json`).
//!
//! One provider type serves three kinds by varying the record type:
//! `Dns` queries `A`, `Nameservers` queries `NS` and `Dnssec` queries `DS`.

use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sitelens_core::{
    Field, FieldValue, LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse,
};
use url::Url;

use crate::client::get_json;

const DNS_JSON: &str = "application/dns-json";

/// Cloudflare resolver endpoint.
pub const CLOUDFLARE_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";
/// Google Public DNS endpoint.
pub const GOOGLE_ENDPOINT: &str = "https://dns.google/resolve";
/// Quad9 endpoint.
pub const QUAD9_ENDPOINT: &str = "https://dns.quad9.net:5053/dns-query";

/// DNS record types this module asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// IPv4 address.
    A,
    /// Nameserver.
    Ns,
    /// Delegation signer; present only for DNSSEC-signed zones.
    Ds,
}

impl RecordType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Ns => "NS",
            Self::Ds => "DS",
        }
    }

    const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Ds => 43,
        }
    }

    const fn for_kind(kind: QueryKind) -> Option<Self> {
        match kind {
            QueryKind::Dns => Some(Self::A),
            QueryKind::Nameservers => Some(Self::Ns),
            QueryKind::Dnssec => Some(Self::Ds),
            _ => None,
        }
    }
}

/// JSON DNS answer document.
#[derive(Debug, Clone, Deserialize)]
pub struct DohResponse {
    /// DNS response code; 0 is `NOERROR`.
    #[serde(rename = "Status")]
    pub status: u32,
    /// Answer section; absent when empty.
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohRecord>,
}

/// One resource record of a [`DohResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct DohRecord {
    /// Numeric record type.
    #[serde(rename = "type")]
    pub rtype: u16,
    /// Time to live, in seconds.
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u64>,
    /// Record data (address, host name, ...).
    pub data: String,
}

impl DohResponse {
    fn records(&self, rtype: RecordType) -> impl Iterator<Item = &DohRecord> {
        self.answer.iter().filter(move |r| r.rtype == rtype.code())
    }
}

/// Classify an address the way reports show it.
#[must_use]
pub fn classify_ip(ip: IpAddr) -> &'static str {
    match ip {
        IpAddr::V6(_) => "IPv6",
        IpAddr::V4(v4) if v4.is_loopback() => "Loopback",
        IpAddr::V4(v4) if v4.is_private() || v4.is_link_local() => "Private",
        IpAddr::V4(_) => "IPv4 Public",
    }
}

/// A DNS-over-HTTPS resolver exposed as a provider.
#[derive(Debug, Clone)]
pub struct DohProvider {
    name: &'static str,
    vendor: &'static str,
    endpoint: String,
    client: Client,
}

impl DohProvider {
    /// Cloudflare (`doh-cloudflare`).
    #[must_use]
    pub fn cloudflare(client: Client) -> Self {
        Self::new("doh-cloudflare", "Cloudflare", CLOUDFLARE_ENDPOINT, client)
    }

    /// Google Public DNS (`doh-google`).
    #[must_use]
    pub fn google(client: Client) -> Self {
        Self::new("doh-google", "Google", GOOGLE_ENDPOINT, client)
    }

    /// Quad9 (`doh-quad9`).
    #[must_use]
    pub fn quad9(client: Client) -> Self {
        Self::new("doh-quad9", "Quad9", QUAD9_ENDPOINT, client)
    }

    /// A resolver at an arbitrary JSON DNS endpoint.
    #[must_use]
    pub fn new(
        name: &'static str,
        vendor: &'static str,
        endpoint: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            name,
            vendor,
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Point this provider at another endpoint (tests, private resolvers).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Run one JSON DNS lookup.
    ///
    /// # Errors
    /// Transport failures, non-success statuses and undecodable bodies.
    pub async fn lookup(&self, name: &str, rtype: RecordType) -> Result<DohResponse, LensError> {
        let url = self.lookup_url(name, rtype)?;
        get_json(&self.client, self.name, url, Some(DNS_JSON)).await
    }

    fn lookup_url(&self, name: &str, rtype: RecordType) -> Result<Url, LensError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", rtype.as_str());
        Ok(url)
    }

    /// First IPv4 address of `host`. IP literals are returned as-is.
    ///
    /// # Errors
    /// `EmptyResult` when the name has no `A` record, plus lookup failures.
    pub async fn resolve_ip(&self, host: &str) -> Result<IpAddr, LensError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        let resp = self.lookup(host, RecordType::A).await?;
        first_ipv4(self.name, &resp).map(|(ip, _)| IpAddr::V4(ip))
    }
}

fn check_rcode(provider: &str, resp: &DohResponse) -> Result<(), LensError> {
    match resp.status {
        0 => Ok(()),
        3 => Err(LensError::empty(provider, "dns name (NXDOMAIN)")),
        code => Err(LensError::empty(provider, format!("dns answer (rcode {code})"))),
    }
}

fn first_ipv4(provider: &str, resp: &DohResponse) -> Result<(Ipv4Addr, Option<u64>), LensError> {
    check_rcode(provider, resp)?;
    resp.records(RecordType::A)
        .find_map(|r| r.data.parse::<Ipv4Addr>().ok().map(|ip| (ip, r.ttl)))
        .ok_or_else(|| LensError::empty(provider, "dns A records"))
}

#[async_trait]
impl LensProvider for DohProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        self.vendor
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        RecordType::for_kind(kind).is_some()
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        let rtype = RecordType::for_kind(query.kind)
            .ok_or_else(|| LensError::unsupported(query.kind.as_str()))?;
        if query.target.host_ip().is_some() {
            return Err(LensError::empty(self.name, "dns records for an IP literal"));
        }
        let url = self.lookup_url(query.host(), rtype)?;
        let doc: serde_json::Value = get_json(&self.client, self.name, url, Some(DNS_JSON)).await?;
        Ok(RawResponse::Json(doc))
    }

    fn normalize(&self, query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        let doc = raw.into_json(self.name)?;
        let resp: DohResponse = serde_json::from_value(doc)
            .map_err(|e| LensError::malformed(self.name, e.to_string()))?;
        let record = NormalizedRecord::unknown(query.kind);

        match query.kind {
            QueryKind::Dns => {
                let (ip, ttl) = first_ipv4(self.name, &resp)?;
                record
                    .with(Field::IpAddress, ip.to_string())?
                    .with(Field::IpType, classify_ip(IpAddr::V4(ip)))?
                    .with(Field::Ttl, ttl.map_or(FieldValue::Unknown, FieldValue::Count))
            }
            QueryKind::Nameservers => {
                check_rcode(self.name, &resp)?;
                let servers: Vec<String> = resp
                    .records(RecordType::Ns)
                    .map(|r| r.data.trim_end_matches('.').to_ascii_lowercase())
                    .collect();
                if servers.is_empty() {
                    return Err(LensError::empty(self.name, "dns NS records"));
                }
                record.with(Field::Nameservers, FieldValue::list(servers))
            }
            QueryKind::Dnssec => {
                check_rcode(self.name, &resp)?;
                let signed = resp.records(RecordType::Ds).next().is_some();
                let status = if signed { "Enabled" } else { "Not enabled" };
                record.with(Field::Dnssec, status)
            }
            other => Err(LensError::unsupported(other.as_str())),
        }
    }
}
