use std::time::Duration;

use sitelens::{FetchStrategy, Lens, LensConfig, LensError, MergeStrategy, QueryKind};

use crate::helpers::{StubProvider, fixtures};

#[test]
fn build_without_providers_fails() {
    let err = Lens::builder().build().err().unwrap();
    assert!(matches!(err, LensError::InvalidArg(_)));
}

#[test]
fn build_with_duplicate_names_fails() {
    let a = StubProvider::builder("same")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let b = StubProvider::builder("same")
        .returns(fixtures::dns_record("2.2.2.2"))
        .build();
    let err = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, LensError::InvalidArg(msg) if msg.contains("same")));
}

#[test]
fn build_with_no_kinds_fails() {
    let a = StubProvider::builder("a")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let err = Lens::builder()
        .with_provider(a)
        .kinds(&[])
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, LensError::InvalidArg(_)));
}

#[test]
fn effective_config_is_normalized() {
    let a = StubProvider::builder("a")
        .returns(fixtures::dns_record("1.1.1.1"))
        .build();
    let lens = Lens::builder()
        .with_provider(a)
        .kinds(&[QueryKind::Dns, QueryKind::Seo, QueryKind::Dns])
        .fetch_strategy(FetchStrategy::Latency)
        .merge_strategy_for(QueryKind::Seo, MergeStrategy::Deep)
        .provider_timeout(Duration::from_secs(2))
        .request_timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let cfg = lens.config();
    assert_eq!(cfg.kinds, vec![QueryKind::Dns, QueryKind::Seo]);
    assert_eq!(cfg.fetch_strategy, FetchStrategy::Latency);
    assert_eq!(cfg.merge_for(QueryKind::Seo), MergeStrategy::Deep);
    assert_eq!(cfg.merge_for(QueryKind::Dns), MergeStrategy::Fallback);
    assert_eq!(cfg.provider_timeout, Duration::from_secs(2));
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(10)));
}

#[test]
fn defaults_match_documented_values() {
    let cfg = LensConfig::default();
    assert_eq!(cfg.provider_timeout, Duration::from_secs(5));
    assert_eq!(cfg.request_timeout, None);
    assert_eq!(cfg.fetch_strategy, FetchStrategy::PriorityWithFallback);
    assert_eq!(cfg.merge_strategy, MergeStrategy::Fallback);
    assert_eq!(cfg.kinds, QueryKind::ALL.to_vec());
}
