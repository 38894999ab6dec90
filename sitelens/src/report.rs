use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;
use sitelens_core::{AggregateResult, Field, FieldValue, QueryKind};

use crate::Analysis;

const NO_CDN: &str = "No CDN detected";
const DNSSEC_ENABLED: &str = "Enabled";

/// Human-readable rendering of an [`Analysis`].
///
/// Every field is a non-empty string: values no provider could determine
/// show the field's unknown label ("Unknown", "Unable to retrieve", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    /// Analysis identifier.
    pub analysis_id: String,
    /// URL as entered (normalized).
    pub url: String,
    /// When the analysis started, formatted in UTC.
    pub analyzed_at: String,
    /// Unix milliseconds at which the analysis finished.
    pub generated_at_ms: i64,

    /// Hostname.
    pub domain: String,
    /// Port (explicit or scheme default).
    pub port: String,
    /// "HTTP" or "HTTPS".
    pub protocol: String,
    /// Resolved IPv4 address.
    pub ip_address: String,
    /// Address classification.
    pub ip_type: String,
    /// Address record TTL.
    pub ttl: String,
    /// Authoritative nameservers.
    pub nameservers: String,

    /// Whether the site answered.
    pub accessible: String,
    /// HTTP status code.
    pub response_code: String,
    /// Probe round-trip time.
    pub response_time: String,

    /// Hosting provider.
    pub hosting_provider: String,
    /// City, region and country of the server.
    pub server_location: String,
    /// Autonomous system.
    pub asn: String,
    /// Network operator.
    pub isp: String,
    /// Server timezone.
    pub timezone: String,
    /// ISO country code.
    pub country_code: String,
    /// Web server software.
    pub web_server: String,
    /// Content delivery network.
    pub cdn: String,
    /// Framework or CMS.
    pub framework: String,
    /// Programming language.
    pub language: String,
    /// Known technologies, joined.
    pub technologies: String,

    /// "Enabled" or "Disabled".
    pub https_status: String,
    /// Certificate status.
    pub ssl_status: String,
    /// Security headers present.
    pub security_headers: String,
    /// DNSSEC status.
    pub dnssec: String,
    /// Heuristic 0-100 score.
    pub security_score: u8,

    /// Document title.
    pub page_title: String,
    /// Meta description.
    pub meta_description: String,
    /// Number of `<h1>` elements.
    pub h1_count: String,
    /// Number of images.
    pub image_count: String,
    /// Number of links.
    pub link_count: String,
    /// Responsive viewport present.
    pub mobile_optimized: String,

    /// Provider that answered each resolved kind.
    pub sources: BTreeMap<QueryKind, String>,
}

fn show(results: &AggregateResult, field: Field) -> String {
    let v = results.field(field);
    if v.is_unknown() {
        field.unknown_label().to_string()
    } else {
        v.to_string()
    }
}

fn known_text(results: &AggregateResult, field: Field) -> Option<&str> {
    results.field(field).as_text()
}

impl SiteReport {
    /// Render `analysis` into display strings, applying fallbacks and derived fields.
    #[must_use]
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let r = &analysis.results;
        let target = &analysis.context.target;

        let https = target.is_https();
        let certificate = https && analysis.tls_verified;
        let ssl_status = match (https, certificate) {
            (false, _) => "No SSL certificate",
            (true, true) => "Certificate accepted",
            (true, false) => "Unverified",
        };

        let has_security_headers = r
            .field(Field::SecurityHeaders)
            .as_list()
            .is_some_and(|l| !l.is_empty());
        let dnssec_on = known_text(r, Field::Dnssec) == Some(DNSSEC_ENABLED);
        let score = security_score(https, certificate, has_security_headers, dnssec_on);

        let technologies = technologies(r);

        let sources = r
            .iter()
            .filter_map(|(k, res)| res.source().map(|s| (k, s.to_string())))
            .collect();

        Self {
            analysis_id: analysis.context.id.clone(),
            url: target.to_string(),
            analyzed_at: analysis
                .context
                .started_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            generated_at_ms: analysis.finished_at.timestamp_millis(),

            domain: target.host().to_string(),
            port: target.port().to_string(),
            protocol: target.protocol().to_string(),
            ip_address: show(r, Field::IpAddress),
            ip_type: show(r, Field::IpType),
            ttl: show(r, Field::Ttl),
            nameservers: show(r, Field::Nameservers),

            accessible: show(r, Field::Accessible),
            response_code: show(r, Field::ResponseCode),
            response_time: show(r, Field::ResponseTime),

            hosting_provider: show(r, Field::HostingProvider),
            server_location: show(r, Field::ServerLocation),
            asn: show(r, Field::Asn),
            isp: show(r, Field::Isp),
            timezone: show(r, Field::Timezone),
            country_code: show(r, Field::CountryCode),
            web_server: show(r, Field::WebServer),
            cdn: show(r, Field::CdnProvider),
            framework: show(r, Field::Framework),
            language: show(r, Field::Language),
            technologies,

            https_status: if https { "Enabled" } else { "Disabled" }.to_string(),
            ssl_status: ssl_status.to_string(),
            security_headers: show(r, Field::SecurityHeaders),
            dnssec: show(r, Field::Dnssec),
            security_score: score,

            page_title: show(r, Field::PageTitle),
            meta_description: show(r, Field::MetaDescription),
            h1_count: show(r, Field::H1Count),
            image_count: show(r, Field::ImageCount),
            link_count: show(r, Field::LinkCount),
            mobile_optimized: show(r, Field::MobileOptimized),

            sources,
        }
    }

    /// Plain-text report with fixed section headers.
    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Suggested file name for [`render_text`](Self::render_text) output.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        let domain: String = self
            .domain
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("sitelens-analysis-{domain}-{}.txt", self.generated_at_ms)
    }
}

/// HTTPS +30, accepted certificate +25, any security header +20, DNSSEC +15.
const fn security_score(https: bool, certificate: bool, headers: bool, dnssec: bool) -> u8 {
    let mut score = 0u8;
    if https {
        score += 30;
    }
    if certificate {
        score += 25;
    }
    if headers {
        score += 20;
    }
    if dnssec {
        score += 15;
    }
    score
}

fn technologies(r: &AggregateResult) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for field in [Field::WebServer, Field::Framework, Field::CdnProvider] {
        if let FieldValue::Text(t) = r.field(field)
            && t != NO_CDN
            && !parts.contains(&t.as_str())
        {
            parts.push(t);
        }
    }
    if parts.is_empty() {
        "Standard web technologies".to_string()
    } else {
        parts.join(", ")
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(title.len()))
}

fn line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "- {label}: {value}")
}

impl fmt::Display for SiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sitelens website analysis report")?;
        writeln!(f, "================================")?;
        writeln!(f)?;
        writeln!(f, "Analysis ID: {}", self.analysis_id)?;
        writeln!(f, "Website: {}", self.url)?;
        writeln!(f, "Analysis Date: {}", self.analyzed_at)?;

        section(f, "DOMAIN INFORMATION")?;
        line(f, "Domain", &self.domain)?;
        line(f, "Port", &self.port)?;
        line(f, "Protocol", &self.protocol)?;
        line(f, Field::IpAddress.label(), &self.ip_address)?;
        line(f, Field::IpType.label(), &self.ip_type)?;
        line(f, Field::Ttl.label(), &self.ttl)?;
        line(f, Field::Nameservers.label(), &self.nameservers)?;
        line(f, Field::ServerLocation.label(), &self.server_location)?;

        section(f, "HOSTING & INFRASTRUCTURE")?;
        line(f, Field::HostingProvider.label(), &self.hosting_provider)?;
        line(f, Field::Asn.label(), &self.asn)?;
        line(f, Field::Isp.label(), &self.isp)?;
        line(f, Field::Timezone.label(), &self.timezone)?;
        line(f, Field::CountryCode.label(), &self.country_code)?;
        line(f, Field::WebServer.label(), &self.web_server)?;
        line(f, Field::CdnProvider.label(), &self.cdn)?;
        line(f, Field::Framework.label(), &self.framework)?;
        line(f, Field::Language.label(), &self.language)?;
        line(f, "Technologies", &self.technologies)?;
        line(f, Field::Accessible.label(), &self.accessible)?;
        line(f, Field::ResponseCode.label(), &self.response_code)?;
        line(f, Field::ResponseTime.label(), &self.response_time)?;

        section(f, "SECURITY ANALYSIS")?;
        line(f, "HTTPS Status", &self.https_status)?;
        line(f, "SSL", &self.ssl_status)?;
        line(f, Field::SecurityHeaders.label(), &self.security_headers)?;
        line(f, Field::Dnssec.label(), &self.dnssec)?;
        line(f, "Security Score", &format!("{}/100", self.security_score))?;

        section(f, "SEO & CONTENT ANALYSIS")?;
        line(f, Field::PageTitle.label(), &self.page_title)?;
        line(f, Field::MetaDescription.label(), &self.meta_description)?;
        line(f, Field::H1Count.label(), &self.h1_count)?;
        line(f, Field::ImageCount.label(), &self.image_count)?;
        line(f, Field::LinkCount.label(), &self.link_count)?;
        line(f, Field::MobileOptimized.label(), &self.mobile_optimized)?;

        section(f, "DISCLAIMER")?;
        writeln!(
            f,
            "This report was generated automatically from publicly available information."
        )?;
        writeln!(
            f,
            "Values shown as unknown could not be determined by any data source in time."
        )
    }
}
