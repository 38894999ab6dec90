use std::time::Duration;

use sitelens::{FetchStrategy, Field, Lens, LensError, QueryKind};

use crate::helpers::{StubProvider, fixtures, query};

#[tokio::test]
async fn latency_returns_fastest_success() {
    let slow = StubProvider::builder("slow")
        .delay_ms(100)
        .returns(fixtures::dns_record("2.2.2.2"))
        .build();
    let fast = StubProvider::builder("fast")
        .delay_ms(10)
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();

    let lens = Lens::builder()
        .with_provider(slow)
        .with_provider(fast)
        .fetch_strategy(FetchStrategy::Latency)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("fast"));
    assert_eq!(res.record().get(Field::IpAddress).as_text(), Some("1.1.1.1"));
}

#[tokio::test]
async fn latency_ignores_faster_failure() {
    let fast_fail = StubProvider::builder("fast_fail")
        .delay_ms(5)
        .fails_for(QueryKind::Dns, LensError::network("fast_fail", "boom"))
        .build();
    let slow_ok = StubProvider::builder("slow_ok")
        .delay_ms(20)
        .returns(fixtures::dns_record("7.7.7.7"))
        .build();

    let lens = Lens::builder()
        .with_provider(fast_fail)
        .with_provider(slow_ok)
        .fetch_strategy(FetchStrategy::Latency)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("slow_ok"));
    assert_eq!(res.errors().len(), 1);
}

#[tokio::test]
async fn latency_all_fail_is_unknown() {
    let a = StubProvider::builder("a")
        .empty_for(QueryKind::Seo)
        .build();
    let b = StubProvider::builder("b")
        .fails_for(QueryKind::Seo, LensError::provider("b", "rate limited"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .fetch_strategy(FetchStrategy::Latency)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert!(!res.succeeded());
    assert_eq!(res.errors().len(), 2);
}

#[tokio::test]
async fn priority_list_overrides_registration_order() {
    let low = StubProvider::builder("low")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let high = StubProvider::builder("high")
        .returns(fixtures::dns_record("2.2.2.2"))
        .build();

    let lens = Lens::builder()
        .with_provider(low.clone())
        .with_provider(high.clone())
        .prefer_for_kind(QueryKind::Dns, &[high.clone(), low.clone()])
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("high"));
    assert_eq!(low.calls(), 0);
}

#[tokio::test]
async fn unlisted_providers_run_after_listed_ones() {
    let a = StubProvider::builder("a")
        .empty_for(QueryKind::Dns)
        .build();
    let b = StubProvider::builder("b")
        .empty_for(QueryKind::Dns)
        .build();
    let c = StubProvider::builder("c")
        .returns(fixtures::dns_record("3.3.3.3"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .with_provider(c)
        .prefer_names_for_kind(QueryKind::Dns, &["c", "nope"])
        .build()
        .unwrap();

    let order: Vec<_> = lens
        .providers_for(QueryKind::Dns)
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    assert_eq!(
        lens.config().per_kind_priority.get(&QueryKind::Dns),
        Some(&vec!["c".to_string()])
    );
}

#[tokio::test]
async fn priority_applies_per_kind_only() {
    let a = StubProvider::builder("a")
        .returns(fixtures::dns_record("1.1.1.1"))
        .returns(fixtures::headers_record("Apache"))
        .build();
    let b = StubProvider::builder("b")
        .returns(fixtures::dns_record("2.2.2.2"))
        .returns(fixtures::headers_record("nginx"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .prefer_names_for_kind(QueryKind::Headers, &["b"])
        .provider_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let dns = lens.resolve(&query(QueryKind::Dns)).await;
    let headers = lens.resolve(&query(QueryKind::Headers)).await;
    assert_eq!(dns.source().map(|k| k.as_str()), Some("a"));
    assert_eq!(headers.source().map(|k| k.as_str()), Some("b"));
}
