//! Ready-made informative records for each query kind.
//!
//! Values are plausible but fixed, so assertions can compare them directly.

use sitelens_core::{Field, FieldValue, NormalizedRecord, QueryKind};

fn record(
    kind: QueryKind,
    values: impl IntoIterator<Item = (Field, FieldValue)>,
) -> NormalizedRecord {
    let mut r = NormalizedRecord::unknown(kind);
    for (field, value) in values {
        // callers only pass fields of `kind`
        let _ = r.set(field, value);
    }
    r
}

/// Reachable site with the given status and latency.
#[must_use]
pub fn reachability_record(status: u64, millis: u64) -> NormalizedRecord {
    record(
        QueryKind::Reachability,
        [
            (Field::Accessible, FieldValue::Flag(true)),
            (Field::ResponseCode, FieldValue::Count(status)),
            (Field::ResponseTime, FieldValue::Millis(millis)),
        ],
    )
}

/// A public IPv4 answer with a five-minute TTL.
#[must_use]
pub fn dns_record(ip: &str) -> NormalizedRecord {
    record(
        QueryKind::Dns,
        [
            (Field::IpAddress, FieldValue::text(ip)),
            (Field::IpType, FieldValue::text("IPv4 Public")),
            (Field::Ttl, FieldValue::Count(300)),
        ],
    )
}

/// Nameserver list.
#[must_use]
pub fn nameservers_record(servers: &[&str]) -> NormalizedRecord {
    record(
        QueryKind::Nameservers,
        [(Field::Nameservers, FieldValue::list(servers.iter().copied()))],
    )
}

/// DNSSEC status.
#[must_use]
pub fn dnssec_record(enabled: bool) -> NormalizedRecord {
    let status = if enabled { "Enabled" } else { "Not enabled" };
    record(QueryKind::Dnssec, [(Field::Dnssec, FieldValue::text(status))])
}

/// Hosting record with a provider and location; other fields fixed.
#[must_use]
pub fn hosting_record(provider: &str, location: &str) -> NormalizedRecord {
    record(
        QueryKind::Hosting,
        [
            (Field::HostingProvider, FieldValue::text(provider)),
            (Field::ServerLocation, FieldValue::text(location)),
            (Field::Asn, FieldValue::text("AS15133")),
            (Field::Isp, FieldValue::text("Edgecast Inc.")),
            (Field::Timezone, FieldValue::text("America/Los_Angeles")),
            (Field::CountryCode, FieldValue::text("US")),
        ],
    )
}

/// Header record with the given server and a typical security header set.
#[must_use]
pub fn headers_record(server: &str) -> NormalizedRecord {
    record(
        QueryKind::Headers,
        [
            (Field::WebServer, FieldValue::text(server)),
            (Field::CdnProvider, FieldValue::text("No CDN detected")),
            (
                Field::SecurityHeaders,
                FieldValue::list(["HSTS", "X-Content-Type-Options"]),
            ),
        ],
    )
}

/// SEO record carrying only a title.
#[must_use]
pub fn seo_title_record(title: &str) -> NormalizedRecord {
    record(QueryKind::Seo, [(Field::PageTitle, FieldValue::text(title))])
}

/// SEO record carrying only content counts.
#[must_use]
pub fn seo_counts_record(h1: u64, images: u64, links: u64) -> NormalizedRecord {
    record(
        QueryKind::Seo,
        [
            (Field::H1Count, FieldValue::Count(h1)),
            (Field::ImageCount, FieldValue::Count(images)),
            (Field::LinkCount, FieldValue::Count(links)),
        ],
    )
}

/// An informative record for every kind, in `QueryKind::ALL` order.
#[must_use]
pub fn full_set() -> Vec<NormalizedRecord> {
    vec![
        reachability_record(200, 120),
        dns_record("93.184.216.34"),
        nameservers_record(&["a.iana-servers.net", "b.iana-servers.net"]),
        dnssec_record(true),
        hosting_record("Edgecast", "Los Angeles, California, United States"),
        headers_record("ECS"),
        seo_title_record("Example Domain"),
    ]
}
