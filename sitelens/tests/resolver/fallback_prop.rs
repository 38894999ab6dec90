use proptest::prelude::*;
use sitelens::{Lens, LensError, QueryKind};

use crate::helpers::{StubProvider, fixtures, query};

const NAMES: [&str; 6] = ["p0", "p1", "p2", "p3", "p4", "p5"];

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn first_healthy_provider_wins_and_later_ones_idle(
        len in 1usize..=6,
        healthy in proptest::option::of(0usize..6),
        empty_mask in any::<u8>(),
    ) {
        tokio_test::block_on(async move {
            let healthy = healthy.filter(|h| *h < len);
            let stubs: Vec<_> = (0..len)
                .map(|i| {
                    let b = StubProvider::builder(NAMES[i]);
                    let b = if Some(i) == healthy {
                        b.returns(fixtures::dns_record("93.184.216.34"))
                    } else if empty_mask & (1 << i) != 0 {
                        b.empty_for(QueryKind::Dns)
                    } else {
                        b.fails_for(QueryKind::Dns, LensError::network(NAMES[i], "down"))
                    };
                    b.build()
                })
                .collect();

            let mut builder = Lens::builder();
            for s in &stubs {
                builder = builder.with_provider(s.clone());
            }
            let lens = builder.build().unwrap();
            let res = lens.resolve(&query(QueryKind::Dns)).await;

            match healthy {
                Some(h) => {
                    assert!(res.succeeded());
                    assert_eq!(res.source().map(|k| k.as_str()), Some(NAMES[h]));
                    assert_eq!(res.errors().len(), h);
                    for (i, s) in stubs.iter().enumerate() {
                        assert_eq!(s.calls(), usize::from(i <= h), "provider {i}");
                    }
                }
                None => {
                    assert!(!res.succeeded());
                    assert!(res.source().is_none());
                    assert_eq!(res.errors().len(), len);
                    assert!(!res.record().is_informative());
                }
            }
        });
    }
}
