use sitelens::{Lens, LensError, QueryKind};

use crate::helpers::{StubProvider, fixtures};

#[tokio::test]
async fn invalid_url_is_rejected_before_any_lookup() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let lens = Lens::builder().with_provider(p.clone()).build().unwrap();

    for bad in ["", "   ", "not a url", "ftp://example.com", "example.com"] {
        let err = lens.analyze(bad).await.err().unwrap();
        assert!(matches!(err, LensError::InvalidArg(_)), "{bad:?} -> {err:?}");
    }
    assert_eq!(p.calls(), 0);
}

#[tokio::test]
async fn analysis_covers_configured_kinds() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("1.1.1.1"))
        .returns(fixtures::reachability_record(200, 42))
        .build();
    let lens = Lens::builder()
        .with_provider(p)
        .kinds(&[QueryKind::Dns, QueryKind::Reachability, QueryKind::Seo])
        .build()
        .unwrap();

    let analysis = lens.analyze("https://Example.com/").await.unwrap();
    assert_eq!(analysis.context.target.host(), "example.com");
    assert!(analysis.context.id.starts_with("analysis_"));
    assert_eq!(analysis.results.len(), 3);
    assert_eq!(analysis.results.succeeded_count(), 2);
    assert!(analysis.finished_at >= analysis.context.started_at);
    assert!(analysis.elapsed() >= chrono::Duration::zero());
}

#[tokio::test]
async fn each_analysis_gets_a_fresh_id() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let lens = Lens::builder()
        .with_provider(p)
        .kinds(&[QueryKind::Dns])
        .build()
        .unwrap();

    let a = lens.analyze("https://example.com").await.unwrap();
    let b = lens.analyze("https://example.com").await.unwrap();
    assert_ne!(a.context.id, b.context.id);
    assert_eq!(a.results, b.results);
}
