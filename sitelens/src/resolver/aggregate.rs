use futures::stream::{FuturesUnordered, StreamExt};
use sitelens_core::{
    AggregateResult, LensError, Query, QueryKind, ResolutionResult, StageEvent, Target,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::core::Lens;

impl Lens {
    /// Resolve several kinds for one target concurrently.
    ///
    /// Every requested kind (duplicates collapsed) appears in the result,
    /// whether it resolved, exhausted its providers, or was cut off by the
    /// configured request deadline. The aggregate itself never fails.
    ///
    /// All resolvers are multiplexed on the calling task; nothing is spawned.
    pub async fn aggregate(&self, target: &Target, kinds: &[QueryKind]) -> AggregateResult {
        self.aggregate_inner(target, kinds, None).await
    }

    /// Like [`aggregate`](Self::aggregate), additionally sending one
    /// [`StageEvent`] per kind as it settles.
    ///
    /// Events are observational only: a dropped receiver does not affect the
    /// result.
    pub async fn aggregate_with_progress(
        &self,
        target: &Target,
        kinds: &[QueryKind],
        progress: UnboundedSender<StageEvent>,
    ) -> AggregateResult {
        self.aggregate_inner(target, kinds, Some(&progress)).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::resolver::aggregate",
            skip(self, target, kinds, progress),
            fields(host = %target.host(), kinds = kinds.len()),
        )
    )]
    pub(crate) async fn aggregate_inner(
        &self,
        target: &Target,
        kinds: &[QueryKind],
        progress: Option<&UnboundedSender<StageEvent>>,
    ) -> AggregateResult {
        let mut unique: Vec<QueryKind> = Vec::with_capacity(kinds.len());
        for k in kinds {
            if !unique.contains(k) {
                unique.push(*k);
            }
        }
        let total = unique.len();
        let queries: Vec<Query> = unique.iter().map(|k| target.query(*k)).collect();

        let mut out = AggregateResult::new();
        let settle = |out: &mut AggregateResult, result: ResolutionResult| {
            let event = StageEvent {
                index: out.len() + 1,
                total,
                kind: result.kind(),
                succeeded: result.succeeded(),
                source: result.source(),
            };
            if out.insert(result)
                && let Some(tx) = progress
            {
                let _ = tx.send(event);
            }
        };

        let mut pending: FuturesUnordered<_> = queries.iter().map(|q| self.resolve(q)).collect();
        let collect = async {
            while let Some(result) = pending.next().await {
                settle(&mut out, result);
            }
        };

        match self.cfg.request_timeout {
            Some(deadline) => {
                if tokio::time::timeout(deadline, collect).await.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                        "request deadline expired; cancelling pending kinds"
                    );
                }
            }
            None => collect.await,
        }
        drop(pending);

        for kind in unique {
            if !out.contains(kind) {
                let errors = vec![LensError::request_timeout(kind.as_str())];
                settle(&mut out, ResolutionResult::exhausted(kind, errors));
            }
        }
        out
    }
}
