use sitelens::{Field, FieldValue, Lens, MergeStrategy, QueryKind};

use crate::helpers::{StubProvider, fixtures, query};

#[tokio::test]
async fn deep_merge_backfills_unknown_fields() {
    let title = StubProvider::builder("title")
        .returns(fixtures::seo_title_record("Example Domain"))
        .build();
    let counts = StubProvider::builder("counts")
        .returns(fixtures::seo_counts_record(1, 0, 1))
        .build();

    let lens = Lens::builder()
        .with_provider(title.clone())
        .with_provider(counts.clone())
        .merge_strategy_for(QueryKind::Seo, MergeStrategy::Deep)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert!(res.succeeded());
    assert_eq!(res.source().map(|k| k.as_str()), Some("title"));
    let rec = res.record();
    assert_eq!(rec.get(Field::PageTitle).as_text(), Some("Example Domain"));
    assert_eq!(rec.get(Field::H1Count), &FieldValue::Count(1));
    assert_eq!(rec.get(Field::ImageCount), &FieldValue::Count(0));
    assert!(rec.get(Field::MetaDescription).is_unknown());
    assert_eq!(title.calls(), 1);
    assert_eq!(counts.calls(), 1);
}

#[tokio::test]
async fn deep_merge_keeps_higher_priority_values() {
    let a = StubProvider::builder("a")
        .returns(fixtures::seo_title_record("From A"))
        .build();
    let b = StubProvider::builder("b")
        .returns(fixtures::seo_title_record("From B"))
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .with_provider(b)
        .prefer_names_for_kind(QueryKind::Seo, &["b", "a"])
        .merge_strategy(MergeStrategy::Deep)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("b"));
    assert_eq!(res.record().get(Field::PageTitle).as_text(), Some("From B"));
}

#[tokio::test]
async fn deep_merge_skips_failures_and_empties() {
    let empty = StubProvider::builder("empty")
        .empty_for(QueryKind::Seo)
        .build();
    let counts = StubProvider::builder("counts")
        .returns(fixtures::seo_counts_record(2, 5, 9))
        .build();

    let lens = Lens::builder()
        .with_provider(empty)
        .with_provider(counts)
        .merge_strategy(MergeStrategy::Deep)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert_eq!(res.source().map(|k| k.as_str()), Some("counts"));
    assert_eq!(res.errors().len(), 1);
    assert_eq!(res.record().get(Field::LinkCount), &FieldValue::Count(9));
}

#[tokio::test]
async fn deep_merge_with_nothing_informative_is_unknown() {
    let a = StubProvider::builder("a")
        .empty_for(QueryKind::Seo)
        .build();

    let lens = Lens::builder()
        .with_provider(a)
        .merge_strategy(MergeStrategy::Deep)
        .build()
        .unwrap();

    let res = lens.resolve(&query(QueryKind::Seo)).await;
    assert!(!res.succeeded());
    assert_eq!(res.record().known_count(), 0);
}
