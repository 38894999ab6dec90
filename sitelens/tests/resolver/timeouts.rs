use std::time::Duration;

use sitelens::{FetchStrategy, Field, Lens, LensError, QueryKind};
use tokio::time::Instant;

use crate::helpers::{StubProvider, fixtures, query};

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out_and_next_answers() {
    let c = StubProvider::builder("stub-c")
        .hangs_for(QueryKind::Hosting)
        .build();
    let d = StubProvider::builder("stub-d")
        .returns(fixtures::hosting_record("Edgecast", "Los Angeles"))
        .build();

    let lens = Lens::builder()
        .with_provider(c.clone())
        .with_provider(d.clone())
        .build()
        .unwrap();

    let started = Instant::now();
    let res = lens.resolve(&query(QueryKind::Hosting)).await;
    let waited = started.elapsed();

    assert!(waited >= Duration::from_secs(5), "waited {waited:?}");
    assert!(waited < Duration::from_secs(6), "waited {waited:?}");
    assert_eq!(res.source().map(|k| k.as_str()), Some("stub-d"));
    assert_eq!(
        res.record().get(Field::HostingProvider).as_text(),
        Some("Edgecast")
    );
    assert_eq!(
        res.errors(),
        &[LensError::ProviderTimeout {
            provider: "stub-c".into(),
            kind: "hosting".into(),
        }]
    );
    assert_eq!(c.calls(), 1);
    assert_eq!(d.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_is_discarded() {
    let slow = StubProvider::builder("slow")
        .delay_ms(200)
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();

    let lens = Lens::builder()
        .with_provider(slow)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert!(!res.succeeded());
    assert!(res.record().get(Field::IpAddress).is_unknown());
    assert!(matches!(res.errors()[0], LensError::ProviderTimeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn provider_declared_timeout_takes_precedence() {
    let quick = StubProvider::builder("quick")
        .timeout(Duration::from_secs(1))
        .hangs_for(QueryKind::Seo)
        .build();

    let lens = Lens::builder()
        .with_provider(quick)
        .provider_timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    let started = Instant::now();
    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert!(!res.succeeded());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn all_timeouts_collapse_to_timed_out() {
    let a = StubProvider::builder("a")
        .hangs_for(QueryKind::Dnssec)
        .build();
    let b = StubProvider::builder("b")
        .hangs_for(QueryKind::Dnssec)
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .provider_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = lens
        .try_resolve(&query(QueryKind::Dnssec))
        .await
        .unwrap_err();
    assert!(matches!(err, LensError::AllProvidersTimedOut { ref kind } if kind == "dnssec"));
}

#[tokio::test(start_paused = true)]
async fn latency_strategy_enforces_timeout_too() {
    let hang = StubProvider::builder("hang")
        .hangs_for(QueryKind::Dns)
        .build();
    let late = StubProvider::builder("late")
        .delay(Duration::from_secs(10))
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();

    let lens = Lens::builder()
        .with_provider(hang)
        .with_provider(late)
        .fetch_strategy(FetchStrategy::Latency)
        .provider_timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let started = Instant::now();
    let res = lens.resolve(&query(QueryKind::Dns)).await;
    assert!(!res.succeeded());
    assert_eq!(res.errors().len(), 2);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn lone_hanging_provider_degrades_after_its_timeout() {
    let c = StubProvider::builder("stub-c")
        .hangs_for(QueryKind::Hosting)
        .build();

    let lens = Lens::builder().with_provider(c).build().unwrap();

    let started = Instant::now();
    let res = lens.resolve(&query(QueryKind::Hosting)).await;
    let waited = started.elapsed();

    assert!(waited >= Duration::from_secs(5) && waited < Duration::from_secs(6));
    assert!(!res.succeeded());
    assert!(res.source().is_none());
    assert_eq!(res.record().known_count(), 0);
}
