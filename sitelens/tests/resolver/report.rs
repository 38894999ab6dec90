use sitelens::{Lens, LensError, QueryKind, SiteReport};

use crate::helpers::{StubProvider, fixtures};

async fn report_for(url: &str, p: std::sync::Arc<StubProvider>) -> SiteReport {
    let lens = Lens::builder().with_provider(p).build().unwrap();
    let analysis = lens.analyze(url).await.unwrap();
    SiteReport::from_analysis(&analysis)
}

#[tokio::test]
async fn unresolved_fields_show_fallback_labels() {
    let p = StubProvider::builder("p")
        .empty_for(QueryKind::Dns)
        .build();
    let report = report_for("http://example.com", p).await;

    assert_eq!(report.ip_address, "Unknown");
    assert_eq!(report.nameservers, "Unable to determine nameservers");
    assert_eq!(report.dnssec, "Unable to verify");
    assert_eq!(report.page_title, "Unable to retrieve");
    assert_eq!(report.h1_count, "Unable to count");
    assert_eq!(report.server_location, "Unknown location");
    assert_eq!(report.technologies, "Standard web technologies");
    assert_eq!(report.https_status, "Disabled");
    assert_eq!(report.ssl_status, "No SSL certificate");
    assert_eq!(report.security_score, 0);
    assert_eq!(report.port, "80");
    assert_eq!(report.protocol, "HTTP");
    assert!(report.sources.is_empty());
}

#[tokio::test]
async fn resolved_fields_and_derived_values() {
    let p = fixtures::full_set()
        .into_iter()
        .fold(StubProvider::builder("p").validates_tls(), |b, r| b.returns(r))
        .build();
    let report = report_for("https://example.com", p).await;

    assert_eq!(report.domain, "example.com");
    assert_eq!(report.ip_address, "93.184.216.34");
    assert_eq!(report.nameservers, "a.iana-servers.net, b.iana-servers.net");
    assert_eq!(report.dnssec, "Enabled");
    assert_eq!(report.response_time, "120ms");
    assert_eq!(report.accessible, "Yes");
    assert_eq!(report.web_server, "ECS");
    assert_eq!(report.technologies, "ECS");
    assert_eq!(report.https_status, "Enabled");
    assert_eq!(report.ssl_status, "Certificate accepted");
    assert_eq!(report.security_score, 90);
    assert_eq!(report.port, "443");
    assert_eq!(report.sources.get(&QueryKind::Dns).map(String::as_str), Some("p"));
}

#[tokio::test]
async fn https_without_reachability_is_unverified() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dnssec_record(true))
        .build();
    let report = report_for("https://example.com", p).await;
    assert_eq!(report.ssl_status, "Unverified");
    assert_eq!(report.security_score, 30 + 15);
}

#[tokio::test]
async fn proxy_reachability_does_not_vouch_for_the_certificate() {
    let direct = StubProvider::builder("direct")
        .validates_tls()
        .fails_for(
            QueryKind::Reachability,
            LensError::network("direct", "invalid peer certificate"),
        )
        .build();
    let proxy = StubProvider::builder("allorigins")
        .returns(fixtures::reachability_record(200, 120))
        .build();
    let lens = Lens::builder()
        .with_provider(direct)
        .with_provider(proxy)
        .build()
        .unwrap();
    let analysis = lens.analyze("https://expired.badssl.com").await.unwrap();
    let report = SiteReport::from_analysis(&analysis);

    assert!(!analysis.tls_verified);
    assert_eq!(report.accessible, "Yes");
    assert_eq!(
        report.sources.get(&QueryKind::Reachability).map(String::as_str),
        Some("allorigins")
    );
    assert_eq!(report.ssl_status, "Unverified");
    assert_eq!(report.security_score, 30);
}

#[tokio::test]
async fn direct_reachability_accepts_the_certificate() {
    let p = StubProvider::builder("direct")
        .validates_tls()
        .returns(fixtures::reachability_record(200, 80))
        .build();
    let report = report_for("https://example.com", p).await;
    assert_eq!(report.ssl_status, "Certificate accepted");
    assert_eq!(report.security_score, 30 + 25);

    let p = StubProvider::builder("direct")
        .validates_tls()
        .returns(fixtures::reachability_record(200, 80))
        .build();
    let report = report_for("http://example.com", p).await;
    assert_eq!(report.ssl_status, "No SSL certificate");
    assert_eq!(report.security_score, 0);
}

#[tokio::test]
async fn text_report_has_every_section() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("93.184.216.34"))
        .build();
    let report = report_for("https://example.com", p).await;
    let text = report.render_text();

    for heading in [
        "DOMAIN INFORMATION",
        "HOSTING & INFRASTRUCTURE",
        "SECURITY ANALYSIS",
        "SEO & CONTENT ANALYSIS",
        "DISCLAIMER",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
    assert!(text.contains(&report.analysis_id));
    assert!(text.contains("- IP Address: 93.184.216.34"));
    assert!(text.contains("- Security Score: 30/100"));
}

#[tokio::test]
async fn export_name_embeds_domain_and_timestamp() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("93.184.216.34"))
        .build();
    let report = report_for("https://example.com:8443/path", p).await;
    let name = report.export_file_name();
    assert_eq!(
        name,
        format!("sitelens-analysis-example.com-{}.txt", report.generated_at_ms)
    );
    assert_eq!(report.port, "8443");
}

#[tokio::test]
async fn json_report_keeps_field_names_and_numeric_score() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("93.184.216.34"))
        .build();
    let report = report_for("https://example.com", p).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["ip_address"], "93.184.216.34");
    assert_eq!(json["security_score"], 30);
    assert_eq!(json["sources"]["dns"], "p");
    assert_eq!(json["hosting_provider"], report.hosting_provider.as_str());
}
