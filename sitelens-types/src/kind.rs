use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Field, LensError};

/// Category of lookup, each with its own provider list and fixed field set.
///
/// Kinds are independent of one another: no kind consumes another kind's
/// output, so they can all be resolved concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    /// Whether the site answers at all, with status and latency.
    Reachability,
    /// Address resolution (A records).
    Dns,
    /// Authoritative nameservers (NS records).
    Nameservers,
    /// DNSSEC delegation signer presence (DS records).
    Dnssec,
    /// Hosting and IP geolocation.
    Hosting,
    /// HTTP response header inspection (server, CDN, security headers).
    Headers,
    /// Page metadata and content metrics.
    Seo,
}

const REACHABILITY_FIELDS: &[Field] = &[Field::Accessible, Field::ResponseCode, Field::ResponseTime];
const DNS_FIELDS: &[Field] = &[Field::IpAddress, Field::IpType, Field::Ttl];
const NAMESERVER_FIELDS: &[Field] = &[Field::Nameservers];
const DNSSEC_FIELDS: &[Field] = &[Field::Dnssec];
const HOSTING_FIELDS: &[Field] = &[
    Field::HostingProvider,
    Field::ServerLocation,
    Field::Asn,
    Field::Isp,
    Field::Timezone,
    Field::CountryCode,
];
const HEADER_FIELDS: &[Field] = &[
    Field::WebServer,
    Field::CdnProvider,
    Field::SecurityHeaders,
    Field::Framework,
    Field::Language,
];
const SEO_FIELDS: &[Field] = &[
    Field::PageTitle,
    Field::MetaDescription,
    Field::H1Count,
    Field::ImageCount,
    Field::LinkCount,
    Field::MobileOptimized,
];

impl QueryKind {
    /// Every kind, in the order an analysis reports its stages.
    pub const ALL: [Self; 7] = [
        Self::Reachability,
        Self::Dns,
        Self::Nameservers,
        Self::Dnssec,
        Self::Hosting,
        Self::Headers,
        Self::Seo,
    ];

    /// Stable, kebab-case identifier for logs, errors and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reachability => "reachability",
            Self::Dns => "dns",
            Self::Nameservers => "nameservers",
            Self::Dnssec => "dnssec",
            Self::Hosting => "hosting",
            Self::Headers => "headers",
            Self::Seo => "seo",
        }
    }

    /// The fixed set of fields every record of this kind carries.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Reachability => REACHABILITY_FIELDS,
            Self::Dns => DNS_FIELDS,
            Self::Nameservers => NAMESERVER_FIELDS,
            Self::Dnssec => DNSSEC_FIELDS,
            Self::Hosting => HOSTING_FIELDS,
            Self::Headers => HEADER_FIELDS,
            Self::Seo => SEO_FIELDS,
        }
    }

    /// Short progress text shown while this kind is being resolved.
    #[must_use]
    pub const fn stage_label(self) -> &'static str {
        match self {
            Self::Reachability => "Establishing connection",
            Self::Dns => "Resolving domain",
            Self::Nameservers => "Looking up nameservers",
            Self::Dnssec => "Checking DNSSEC",
            Self::Hosting => "Scanning hosting infrastructure",
            Self::Headers => "Inspecting response headers",
            Self::Seo => "Analyzing page content",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| LensError::InvalidArg(format!("unknown query kind: {s}")))
    }
}
