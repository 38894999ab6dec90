use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use sitelens_core::{
    FetchStrategy, LensError, LensProvider, MergeStrategy, NormalizedRecord, ProviderKey, Query,
    ResolutionResult, merge_records_by_priority,
};

use crate::core::{Lens, tag_err};
use crate::resolver::util::collapse_errors;

type Attempt = (usize, ProviderKey, Result<NormalizedRecord, LensError>);

impl Lens {
    /// Resolve one query against its providers.
    ///
    /// Never fails: when no provider yields an informative record the result
    /// carries the all-`Unknown` record, `succeeded == false`, no source, and
    /// the failures observed along the way.
    ///
    /// - `Fallback` merge with `PriorityWithFallback`: providers run one at a
    ///   time in priority order and the first informative record wins; later
    ///   providers are never called.
    /// - `Fallback` merge with `Latency`: providers race; the first
    ///   informative record wins and the rest are cancelled.
    /// - `Deep` merge: every provider runs and unknown fields are filled from
    ///   lower-priority providers.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::resolver::resolve",
            skip(self, query),
            fields(kind = %query.kind, host = %query.host()),
        )
    )]
    pub async fn resolve(&self, query: &Query) -> ResolutionResult {
        let providers = self.registry.providers_for(query.kind);
        let result = match self.cfg.merge_for(query.kind) {
            MergeStrategy::Deep => self.resolve_deep(query, &providers).await,
            MergeStrategy::Fallback => match self.cfg.fetch_strategy {
                FetchStrategy::PriorityWithFallback => {
                    self.resolve_priority_with_fallback(query, &providers).await
                }
                FetchStrategy::Latency => self.resolve_latency(query, &providers).await,
            },
        };
        #[cfg(feature = "tracing")]
        tracing::info!(
            kind = %query.kind,
            succeeded = result.succeeded(),
            source = result.source().map_or("none", |k| k.as_str()),
            failures = result.errors().len(),
            "resolved"
        );
        result
    }

    /// Resolve one query, turning an unsuccessful resolution into an error.
    ///
    /// # Errors
    /// `Unsupported` when no provider serves the kind, `AllProvidersTimedOut`
    /// when every attempt timed out, otherwise `AllProvidersFailed` with the
    /// individual failures.
    pub async fn try_resolve(&self, query: &Query) -> Result<ResolutionResult, LensError> {
        let attempted_any = !self.registry.providers_for(query.kind).is_empty();
        let result = self.resolve(query).await;
        if result.succeeded() {
            Ok(result)
        } else {
            Err(collapse_errors(
                query.kind,
                attempted_any,
                result.errors().to_vec(),
            ))
        }
    }

    /// One provider call: fetch under timeout, normalize, and reject records
    /// that are of the wrong kind or carry nothing.
    async fn attempt(
        &self,
        p: &Arc<dyn LensProvider>,
        query: &Query,
    ) -> Result<NormalizedRecord, LensError> {
        let name = p.name();
        let raw = Self::provider_call_with_timeout(
            name,
            query.kind,
            self.timeout_for(p.as_ref()),
            p.fetch(query),
        )
        .await
        .map_err(|e| tag_err(name, e))?;
        let record = p.normalize(query, raw).map_err(|e| tag_err(name, e))?;
        if record.kind() != query.kind {
            return Err(LensError::empty(
                name,
                format!("{} (got a {} record)", query.kind, record.kind()),
            ));
        }
        if !record.is_informative() {
            return Err(LensError::empty(name, query.kind.as_str()));
        }
        Ok(record)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::resolver::resolve_priority_with_fallback",
            skip(self, query, providers),
            fields(kind = %query.kind),
        )
    )]
    async fn resolve_priority_with_fallback(
        &self,
        query: &Query,
        providers: &[Arc<dyn LensProvider>],
    ) -> ResolutionResult {
        let mut errors: Vec<LensError> = Vec::new();
        for p in providers {
            match self.attempt(p, query).await {
                Ok(record) => return ResolutionResult::resolved(record, p.key(), errors),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(provider = p.name(), error = %e, "provider failed");
                    errors.push(e);
                }
            }
        }
        ResolutionResult::exhausted(query.kind, errors)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::resolver::resolve_latency",
            skip(self, query, providers),
            fields(kind = %query.kind),
        )
    )]
    async fn resolve_latency(
        &self,
        query: &Query,
        providers: &[Arc<dyn LensProvider>],
    ) -> ResolutionResult {
        let mut futs = FuturesUnordered::new();
        for p in providers {
            futs.push(async move { (p.key(), self.attempt(p, query).await) });
        }

        let mut errors: Vec<LensError> = Vec::new();
        while let Some((key, res)) = futs.next().await {
            match res {
                Ok(record) => return ResolutionResult::resolved(record, key, errors),
                Err(e) => errors.push(e),
            }
        }
        ResolutionResult::exhausted(query.kind, errors)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::resolver::resolve_deep",
            skip(self, query, providers),
            fields(kind = %query.kind),
        )
    )]
    async fn resolve_deep(
        &self,
        query: &Query,
        providers: &[Arc<dyn LensProvider>],
    ) -> ResolutionResult {
        let mut futs: FuturesUnordered<_> = providers
            .iter()
            .enumerate()
            .map(|(i, p)| async move { (i, p.key(), self.attempt(p, query).await) })
            .collect();

        let mut attempts: Vec<Attempt> = Vec::with_capacity(providers.len());
        while let Some(a) = futs.next().await {
            attempts.push(a);
        }
        attempts.sort_by_key(|(i, _, _)| *i);

        let mut records: Vec<(ProviderKey, NormalizedRecord)> = Vec::new();
        let mut errors: Vec<LensError> = Vec::new();
        for (_, key, res) in attempts {
            match res {
                Ok(record) => records.push((key, record)),
                Err(e) => errors.push(e),
            }
        }

        match merge_records_by_priority(query.kind, records) {
            Ok(Some((record, source))) => ResolutionResult::resolved(record, source, errors),
            Ok(None) => ResolutionResult::exhausted(query.kind, errors),
            Err(e) => {
                errors.push(e);
                ResolutionResult::exhausted(query.kind, errors)
            }
        }
    }
}
