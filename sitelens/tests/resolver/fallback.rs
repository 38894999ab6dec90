use sitelens::{Field, FieldValue, Lens, LensError, QueryKind};

use crate::helpers::{StubProvider, fixtures, query};

#[tokio::test]
async fn first_informative_record_short_circuits() {
    let a = StubProvider::builder("stub-a")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let b = StubProvider::builder("stub-b")
        .returns(fixtures::dns_record("2.2.2.2"))
        .build();

    let lens = Lens::builder()
        .with_provider(a.clone())
        .with_provider(b.clone())
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert!(res.succeeded());
    assert_eq!(res.source().map(|k| k.as_str()), Some("stub-a"));
    assert_eq!(
        res.record().get(Field::IpAddress),
        &FieldValue::text("1.1.1.1")
    );
    assert!(res.errors().is_empty());
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0, "later providers must not be called");
}

#[tokio::test]
async fn empty_record_advances_to_next_provider() {
    let a = StubProvider::builder("stub-a")
        .empty_for(QueryKind::Dns)
        .build();
    let b = StubProvider::builder("stub-b")
        .returns(fixtures::dns_record("93.184.216.34"))
        .build();

    let lens = Lens::builder()
        .with_provider(a.clone())
        .with_provider(b.clone())
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("stub-b"));
    assert_eq!(
        res.record().get(Field::IpAddress).as_text(),
        Some("93.184.216.34")
    );
    assert_eq!(res.errors().len(), 1);
    assert!(matches!(
        &res.errors()[0],
        LensError::EmptyResult { provider, .. } if provider == "stub-a"
    ));
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
}

#[tokio::test]
async fn hard_failures_are_collected_and_skipped() {
    let a = StubProvider::builder("stub-a")
        .fails_for(QueryKind::Hosting, LensError::network("stub-a", "connection refused"))
        .build();
    let b = StubProvider::builder("stub-b")
        .fails_for(
            QueryKind::Hosting,
            LensError::malformed("stub-b", "expected object"),
        )
        .build();
    let c = StubProvider::builder("stub-c")
        .returns(fixtures::hosting_record("Edgecast", "Los Angeles"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .with_provider(c)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Hosting)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("stub-c"));
    assert_eq!(res.errors().len(), 2);
    assert!(matches!(res.errors()[0], LensError::Network { .. }));
    assert!(matches!(res.errors()[1], LensError::MalformedResponse { .. }));
}

#[tokio::test]
async fn all_failing_yields_default_record() {
    let a = StubProvider::builder("stub-a")
        .fails_for(QueryKind::Nameservers, LensError::network("stub-a", "down"))
        .build();
    let b = StubProvider::builder("stub-b")
        .empty_for(QueryKind::Nameservers)
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Nameservers)).await;
    assert!(!res.succeeded());
    assert!(res.source().is_none());
    assert_eq!(res.record().kind(), QueryKind::Nameservers);
    assert_eq!(res.record().known_count(), 0);
    for field in QueryKind::Nameservers.fields() {
        assert!(res.record().get(*field).is_unknown());
    }
    assert_eq!(res.errors().len(), 2);
}

#[tokio::test]
async fn kind_without_providers_is_unknown_not_error() {
    let a = StubProvider::builder("stub-a")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let lens = Lens::builder().with_provider(a.clone()).build().unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert!(!res.succeeded());
    assert!(res.errors().is_empty());
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn record_of_wrong_kind_is_rejected() {
    let a = StubProvider::builder("stub-a")
        .returns_for(QueryKind::Dns, fixtures::hosting_record("Edgecast", "LA"))
        .build();
    let b = StubProvider::builder("stub-b")
        .returns(fixtures::dns_record("9.9.9.9"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("stub-b"));
    assert_eq!(res.record().kind(), QueryKind::Dns);
    assert!(matches!(res.errors()[0], LensError::EmptyResult { .. }));
}

#[tokio::test]
async fn resolving_twice_gives_the_same_result() {
    let a = StubProvider::builder("stub-a")
        .empty_for(QueryKind::Headers)
        .build();
    let b = StubProvider::builder("stub-b")
        .returns(fixtures::headers_record("nginx"))
        .build();
    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .build()
        .unwrap();

    let q = query(QueryKind::Headers);
    let first = lens.resolve(&q).await;
    let second = lens.resolve(&q).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn try_resolve_collapses_failures() {
    let a = StubProvider::builder("stub-a")
        .fails_for(QueryKind::Dns, LensError::network("stub-a", "down"))
        .build();
    let b = StubProvider::builder("stub-b")
        .empty_for(QueryKind::Dns)
        .build();
    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .build()
        .unwrap();

    let err = lens.try_resolve(&query(QueryKind::Dns)).await.unwrap_err();
    match err {
        LensError::AllProvidersFailed(errs) => assert_eq!(errs.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = lens.try_resolve(&query(QueryKind::Seo)).await.unwrap_err();
    assert!(matches!(err, LensError::Unsupported { .. }));
}
