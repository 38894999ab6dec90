//! Interpretation of HTTP response headers into a `Headers` record.
//!
//! Shared by every provider that sees the site's headers, directly or through
//! a header-dump service.

use bitflags::bitflags;
use sitelens_core::{Field, FieldValue, LensError, NormalizedRecord, QueryKind};

bitflags! {
    /// Security-related response headers present on a site.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SecurityHeaders: u8 {
        /// `Content-Security-Policy`.
        const CSP = 1 << 0;
        /// `X-Frame-Options`.
        const X_FRAME_OPTIONS = 1 << 1;
        /// `X-Content-Type-Options`.
        const X_CONTENT_TYPE_OPTIONS = 1 << 2;
        /// `Strict-Transport-Security`.
        const HSTS = 1 << 3;
        /// `Referrer-Policy`.
        const REFERRER_POLICY = 1 << 4;
        /// `Permissions-Policy`.
        const PERMISSIONS_POLICY = 1 << 5;
    }
}

const SECURITY_HEADER_NAMES: [(&str, SecurityHeaders, &str); 6] = [
    ("content-security-policy", SecurityHeaders::CSP, "CSP"),
    (
        "x-frame-options",
        SecurityHeaders::X_FRAME_OPTIONS,
        "X-Frame-Options",
    ),
    (
        "x-content-type-options",
        SecurityHeaders::X_CONTENT_TYPE_OPTIONS,
        "X-Content-Type-Options",
    ),
    ("strict-transport-security", SecurityHeaders::HSTS, "HSTS"),
    (
        "referrer-policy",
        SecurityHeaders::REFERRER_POLICY,
        "Referrer-Policy",
    ),
    (
        "permissions-policy",
        SecurityHeaders::PERMISSIONS_POLICY,
        "Permissions-Policy",
    ),
];

impl SecurityHeaders {
    /// Flags for the header names present in `names` (case-insensitive).
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = Self::empty();
        for name in names {
            for (header, flag, _) in SECURITY_HEADER_NAMES {
                if name.eq_ignore_ascii_case(header) {
                    out |= flag;
                }
            }
        }
        out
    }

    /// Short display labels, in a fixed order.
    #[must_use]
    pub fn labels(self) -> Vec<&'static str> {
        SECURITY_HEADER_NAMES
            .iter()
            .filter(|(_, flag, _)| self.contains(*flag))
            .map(|(_, _, label)| *label)
            .collect()
    }
}

const SERVER_NAMES: [(&str, &str); 6] = [
    ("apache", "Apache HTTP Server"),
    ("nginx", "Nginx"),
    ("iis", "Microsoft IIS"),
    ("cloudflare", "Cloudflare"),
    ("lighttpd", "Lighttpd"),
    ("caddy", "Caddy"),
];

/// Canonical name of a `Server` header value; unknown servers pass through.
#[must_use]
pub fn clean_server_name(server: &str) -> String {
    let lower = server.to_ascii_lowercase();
    SERVER_NAMES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or_else(|| server.trim().to_string(), |(_, name)| (*name).to_string())
}

/// CDN in front of the site, judged from header names and values.
#[must_use]
pub fn detect_cdn(headers: &[(String, String)]) -> &'static str {
    let has_name = |n: &str| headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(n));
    let any_value = |needle: &str| {
        headers
            .iter()
            .any(|(_, v)| v.to_ascii_lowercase().contains(needle))
    };

    if has_name("cf-ray") || any_value("cloudflare") {
        "Cloudflare CDN"
    } else if has_name("x-fastly-request-id") || any_value("fastly") {
        "Fastly CDN"
    } else if has_name("x-amz-cf-id") || any_value("cloudfront") {
        "Amazon CloudFront"
    } else if has_name("x-akamai-transformed") || any_value("akamai") {
        "Akamai"
    } else {
        "No CDN detected"
    }
}

/// Framework and language implied by an `X-Powered-By` value.
fn from_powered_by(powered_by: &str) -> (String, Option<&'static str>) {
    let lower = powered_by.to_ascii_lowercase();
    if lower.contains("php") {
        ("PHP Application".into(), Some("PHP"))
    } else if lower.contains("asp.net") {
        ("ASP.NET".into(), Some("C#"))
    } else if lower.contains("express") {
        ("Express.js".into(), Some("Node.js"))
    } else if lower.contains("next.js") {
        ("Next.js".into(), Some("JavaScript"))
    } else {
        (powered_by.trim().to_string(), None)
    }
}

const HOSTED_PLATFORMS: [(&str, &str, &str); 5] = [
    ("github.io", "GitHub Pages", "Static"),
    ("netlify.app", "Netlify", "JAMstack"),
    ("vercel.app", "Vercel", "JavaScript"),
    ("herokuapp.com", "Heroku", "Various"),
    ("wordpress.com", "WordPress", "PHP"),
];

/// Platform and language for sites on a well-known hosting domain.
#[must_use]
pub fn platform_for_host(host: &str) -> Option<(&'static str, &'static str)> {
    HOSTED_PLATFORMS
        .iter()
        .find(|(suffix, _, _)| host == *suffix || host.ends_with(&format!(".{suffix}")))
        .map(|(_, platform, language)| (*platform, *language))
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Build a `Headers` record from one response's headers.
///
/// With no headers at all the record stays entirely `Unknown`. Otherwise
/// CDN and security headers are always determined, since their absence was
/// observed.
///
/// # Errors
/// Never in practice; field/kind mismatches are reported as `InvalidArg`.
pub fn headers_record(
    headers: &[(String, String)],
    host: &str,
) -> Result<NormalizedRecord, LensError> {
    let mut record = NormalizedRecord::unknown(QueryKind::Headers);
    if headers.is_empty() {
        return Ok(record);
    }

    if let Some(server) = header(headers, "server") {
        record.set(Field::WebServer, clean_server_name(server))?;
    }
    record.set(Field::CdnProvider, detect_cdn(headers))?;
    let security = SecurityHeaders::from_names(headers.iter().map(|(k, _)| k.as_str()));
    record.set(Field::SecurityHeaders, FieldValue::list(security.labels()))?;

    let (framework, language) = match header(headers, "x-powered-by") {
        Some(p) => from_powered_by(p),
        None => match platform_for_host(host) {
            Some((platform, language)) => (platform.to_string(), Some(language)),
            None => (String::new(), None),
        },
    };
    record.set(Field::Framework, FieldValue::text(framework))?;
    record.set(Field::Language, FieldValue::opt_text(language))?;
    Ok(record)
}
