use core::fmt;

use serde::{Deserialize, Serialize};

use crate::QueryKind;

/// Provider-independent semantic field of a normalized record.
///
/// Each field belongs to exactly one [`QueryKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    /// Whether the site answered.
    Accessible,
    /// HTTP status code returned by the site.
    ResponseCode,
    /// Round-trip time of the probe.
    ResponseTime,

    /// First IPv4 address the domain resolves to.
    IpAddress,
    /// Classification of that address (public, private, IPv6, ...).
    IpType,
    /// TTL of the address record, in seconds.
    Ttl,

    /// Authoritative nameservers.
    Nameservers,

    /// DNSSEC status ("Enabled" / "Not enabled").
    Dnssec,

    /// Hosting provider derived from the network owner or domain.
    HostingProvider,
    /// City, region and country of the server.
    ServerLocation,
    /// Autonomous system of the server's network.
    Asn,
    /// Internet service provider of the server's network.
    Isp,
    /// Server timezone.
    Timezone,
    /// ISO country code of the server.
    CountryCode,

    /// Web server software.
    WebServer,
    /// Content delivery network in front of the site.
    CdnProvider,
    /// Security headers present on the response.
    SecurityHeaders,
    /// Framework or CMS.
    Framework,
    /// Programming language or runtime.
    Language,

    /// Document title.
    PageTitle,
    /// Meta description.
    MetaDescription,
    /// Number of `<h1>` elements.
    H1Count,
    /// Number of images.
    ImageCount,
    /// Number of links.
    LinkCount,
    /// Whether the page declares a responsive viewport.
    MobileOptimized,
}

impl Field {
    /// The query kind whose records carry this field.
    #[must_use]
    pub const fn kind(self) -> QueryKind {
        match self {
            Self::Accessible | Self::ResponseCode | Self::ResponseTime => QueryKind::Reachability,
            Self::IpAddress | Self::IpType | Self::Ttl => QueryKind::Dns,
            Self::Nameservers => QueryKind::Nameservers,
            Self::Dnssec => QueryKind::Dnssec,
            Self::HostingProvider
            | Self::ServerLocation
            | Self::Asn
            | Self::Isp
            | Self::Timezone
            | Self::CountryCode => QueryKind::Hosting,
            Self::WebServer
            | Self::CdnProvider
            | Self::SecurityHeaders
            | Self::Framework
            | Self::Language => QueryKind::Headers,
            Self::PageTitle
            | Self::MetaDescription
            | Self::H1Count
            | Self::ImageCount
            | Self::LinkCount
            | Self::MobileOptimized => QueryKind::Seo,
        }
    }

    /// Stable, kebab-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessible => "accessible",
            Self::ResponseCode => "response-code",
            Self::ResponseTime => "response-time",
            Self::IpAddress => "ip-address",
            Self::IpType => "ip-type",
            Self::Ttl => "ttl",
            Self::Nameservers => "nameservers",
            Self::Dnssec => "dnssec",
            Self::HostingProvider => "hosting-provider",
            Self::ServerLocation => "server-location",
            Self::Asn => "asn",
            Self::Isp => "isp",
            Self::Timezone => "timezone",
            Self::CountryCode => "country-code",
            Self::WebServer => "web-server",
            Self::CdnProvider => "cdn-provider",
            Self::SecurityHeaders => "security-headers",
            Self::Framework => "framework",
            Self::Language => "language",
            Self::PageTitle => "page-title",
            Self::MetaDescription => "meta-description",
            Self::H1Count => "h1-count",
            Self::ImageCount => "image-count",
            Self::LinkCount => "link-count",
            Self::MobileOptimized => "mobile-optimized",
        }
    }

    /// Human-readable label used by reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accessible => "Accessible",
            Self::ResponseCode => "Response Code",
            Self::ResponseTime => "Response Time",
            Self::IpAddress => "IP Address",
            Self::IpType => "IP Type",
            Self::Ttl => "TTL",
            Self::Nameservers => "Nameservers",
            Self::Dnssec => "DNSSEC",
            Self::HostingProvider => "Hosting Provider",
            Self::ServerLocation => "Server Location",
            Self::Asn => "ASN",
            Self::Isp => "ISP",
            Self::Timezone => "Timezone",
            Self::CountryCode => "Country Code",
            Self::WebServer => "Web Server",
            Self::CdnProvider => "CDN",
            Self::SecurityHeaders => "Security Headers",
            Self::Framework => "Framework",
            Self::Language => "Programming Language",
            Self::PageTitle => "Page Title",
            Self::MetaDescription => "Meta Description",
            Self::H1Count => "H1 Tags",
            Self::ImageCount => "Images",
            Self::LinkCount => "Links",
            Self::MobileOptimized => "Mobile Optimized",
        }
    }

    /// Text shown in place of an `Unknown` value. Never blank.
    #[must_use]
    pub const fn unknown_label(self) -> &'static str {
        match self {
            Self::Accessible | Self::ResponseCode => "Unable to connect",
            Self::ResponseTime => "Not measured",
            Self::Nameservers => "Unable to determine nameservers",
            Self::Dnssec => "Unable to verify",
            Self::HostingProvider | Self::Framework => "Unable to determine",
            Self::ServerLocation => "Unknown location",
            Self::SecurityHeaders => "Unable to check",
            Self::PageTitle | Self::MetaDescription => "Unable to retrieve",
            Self::H1Count | Self::ImageCount | Self::LinkCount => "Unable to count",
            Self::IpAddress
            | Self::IpType
            | Self::Ttl
            | Self::Asn
            | Self::Isp
            | Self::Timezone
            | Self::CountryCode
            | Self::WebServer
            | Self::CdnProvider
            | Self::Language
            | Self::MobileOptimized => "Unknown",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
