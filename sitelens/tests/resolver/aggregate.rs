use std::collections::BTreeSet;
use std::time::Duration;

use sitelens::{Field, Lens, LensError, QueryKind, StageEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::helpers::{StubProvider, fixtures, target};

fn full_stub(name: &'static str) -> std::sync::Arc<StubProvider> {
    fixtures::full_set()
        .into_iter()
        .fold(StubProvider::builder(name), |b, r| b.returns(r))
        .build()
}

#[tokio::test]
async fn every_requested_kind_is_present() {
    let lens = Lens::builder()
        .with_provider(full_stub("all"))
        .build()
        .unwrap();

    let kinds = [
        QueryKind::Dns,
        QueryKind::Hosting,
        QueryKind::Dns,
        QueryKind::Seo,
    ];
    let out = lens.aggregate(&target(), &kinds).await;

    assert_eq!(out.len(), 3);
    let got: BTreeSet<_> = out.kinds().collect();
    let want: BTreeSet<_> = [QueryKind::Dns, QueryKind::Hosting, QueryKind::Seo]
        .into_iter()
        .collect();
    assert_eq!(got, want);
    assert_eq!(out.succeeded_count(), 3);
    assert_eq!(
        out.field(Field::IpAddress).as_text(),
        Some("93.184.216.34")
    );
}

#[tokio::test]
async fn failing_kinds_do_not_affect_others() {
    let dns = StubProvider::builder("dns")
        .returns(fixtures::dns_record("1.2.3.4"))
        .fails_for(QueryKind::Hosting, LensError::network("dns", "down"))
        .build();

    let lens = Lens::builder().with_provider(dns).build().unwrap();
    let out = lens
        .aggregate(&target(), &[QueryKind::Dns, QueryKind::Hosting, QueryKind::Seo])
        .await;

    assert_eq!(out.len(), 3);
    assert!(out.get(QueryKind::Dns).unwrap().succeeded());
    assert!(!out.get(QueryKind::Hosting).unwrap().succeeded());
    assert!(!out.get(QueryKind::Seo).unwrap().succeeded());
    assert_eq!(
        out.field(Field::HostingProvider),
        &sitelens::FieldValue::Unknown
    );
}

#[tokio::test(start_paused = true)]
async fn kinds_resolve_concurrently() {
    let slow = fixtures::full_set()
        .into_iter()
        .fold(StubProvider::builder("slow").delay_ms(100), |b, r| {
            b.returns(r)
        })
        .build();

    let lens = Lens::builder().with_provider(slow).build().unwrap();

    let started = Instant::now();
    let out = lens.aggregate(&target(), &QueryKind::ALL).await;
    assert_eq!(out.succeeded_count(), QueryKind::ALL.len());
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn request_deadline_keeps_settled_kinds() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("1.2.3.4"))
        .hangs_for(QueryKind::Hosting)
        .build();

    let lens = Lens::builder()
        .with_provider(p)
        .provider_timeout(Duration::from_secs(5))
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let started = Instant::now();
    let out = lens
        .aggregate(&target(), &[QueryKind::Dns, QueryKind::Hosting])
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(out.len(), 2);
    assert!(out.get(QueryKind::Dns).unwrap().succeeded());
    let hosting = out.get(QueryKind::Hosting).unwrap();
    assert!(!hosting.succeeded());
    assert_eq!(
        hosting.errors(),
        &[LensError::RequestTimeout {
            kind: "hosting".into()
        }]
    );
}

#[tokio::test]
async fn progress_reports_each_kind_once() {
    let lens = Lens::builder()
        .with_provider(full_stub("all"))
        .build()
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel::<StageEvent>();
    let out = lens
        .aggregate_with_progress(&target(), &QueryKind::ALL, tx)
        .await;

    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }

    assert_eq!(events.len(), out.len());
    let indices: Vec<_> = events.iter().map(|e| e.index).collect();
    assert_eq!(indices, (1..=QueryKind::ALL.len()).collect::<Vec<_>>());
    assert!(events.iter().all(|e| e.total == QueryKind::ALL.len()));
    let kinds: BTreeSet<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds.len(), QueryKind::ALL.len());
    assert!(events.iter().all(|e| e.succeeded && e.source.is_some()));
}

#[tokio::test(start_paused = true)]
async fn progress_covers_kinds_cut_off_by_deadline() {
    let p = StubProvider::builder("p")
        .returns(fixtures::dns_record("1.2.3.4"))
        .hangs_for(QueryKind::Seo)
        .build();

    let lens = Lens::builder()
        .with_provider(p)
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _ = lens
        .aggregate_with_progress(&target(), &[QueryKind::Dns, QueryKind::Seo], tx)
        .await;

    let first: StageEvent = rx.recv().await.unwrap();
    let second: StageEvent = rx.recv().await.unwrap();
    assert_eq!((first.kind, first.succeeded), (QueryKind::Dns, true));
    assert_eq!((second.kind, second.succeeded), (QueryKind::Seo, false));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn dropped_receiver_does_not_affect_result() {
    let lens = Lens::builder()
        .with_provider(full_stub("all"))
        .build()
        .unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let out = lens
        .aggregate_with_progress(&target(), &[QueryKind::Dns], tx)
        .await;
    assert_eq!(out.succeeded_count(), 1);
}
