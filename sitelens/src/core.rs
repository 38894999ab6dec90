#[cfg(feature = "tracing")]
use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use sitelens_core::{
    FetchStrategy, LensConfig, LensError, LensProvider, MergeStrategy, ProviderRegistry, QueryKind,
};

/// Orchestrator that resolves queries across registered providers.
pub struct Lens {
    pub(crate) registry: ProviderRegistry,
    pub(crate) cfg: LensConfig,
}

/// Builder for constructing a `Lens` orchestrator with custom configuration.
pub struct LensBuilder {
    providers: Vec<Arc<dyn LensProvider>>,
    cfg: LensConfig,
}

impl Default for LensBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LensBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no providers; register at least one via
    ///   [`with_provider`](Self::with_provider).
    /// - Defaults: priority-with-fallback fetches, first-success merging for
    ///   every kind, 5s provider timeout, no aggregate deadline, all kinds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: vec![],
            cfg: LensConfig::default(),
        }
    }

    /// Register a provider.
    ///
    /// Behavior and trade-offs:
    /// - Registration order is the execution order for kinds without an
    ///   explicit priority list.
    /// - Provider names must be unique; `build` rejects duplicates.
    #[must_use]
    pub fn with_provider(mut self, p: Arc<dyn LensProvider>) -> Self {
        self.providers.push(p);
        self
    }

    /// Set preferred providers for a kind using provider instances.
    ///
    /// Behavior and trade-offs:
    /// - Influences ordering among providers serving `kind`; it does not filter
    ///   out unlisted providers (they run after the listed ones).
    #[must_use]
    pub fn prefer_for_kind(
        mut self,
        kind: QueryKind,
        providers_desc: &[Arc<dyn LensProvider>],
    ) -> Self {
        let names: Vec<String> = providers_desc
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        self.cfg.per_kind_priority.insert(kind, names);
        self
    }

    /// Set preferred providers for a kind by provider name.
    ///
    /// Unknown names are dropped at `build`.
    #[must_use]
    pub fn prefer_names_for_kind(mut self, kind: QueryKind, names: &[&str]) -> Self {
        self.cfg
            .per_kind_priority
            .insert(kind, names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    /// Select the fetch strategy for multi-provider kinds.
    ///
    /// Behavior and trade-offs:
    /// - `PriorityWithFallback`: deterministic order, applies per-provider
    ///   timeout, records every failure; slower but predictable.
    /// - `Latency`: race all eligible providers and keep the first informative
    ///   record; fastest typical latency but sends every request.
    #[must_use]
    pub const fn fetch_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.cfg.fetch_strategy = strategy;
        self
    }

    /// Select the default merge strategy.
    ///
    /// Behavior and trade-offs:
    /// - `Fallback`: stop at the first informative record.
    /// - `Deep`: query every eligible provider concurrently and backfill
    ///   unknown fields; most complete records at the cost of more requests.
    #[must_use]
    pub const fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.cfg.merge_strategy = strategy;
        self
    }

    /// Override the merge strategy for one kind.
    #[must_use]
    pub fn merge_strategy_for(mut self, kind: QueryKind, strategy: MergeStrategy) -> Self {
        self.cfg.per_kind_merge.insert(kind, strategy);
        self
    }

    /// Set the per-provider request timeout.
    ///
    /// Behavior and trade-offs:
    /// - Bounds every provider call in every strategy. Providers that declare
    ///   their own timeout keep it.
    /// - A late response after expiry is discarded.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set an overall deadline for aggregates.
    ///
    /// Behavior and trade-offs:
    /// - Bounds total latency even when providers time out one after another.
    /// - Kinds still pending at the deadline are cancelled and reported as
    ///   unresolved with a `RequestTimeout` error; settled kinds are kept.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Select the kinds an analysis resolves. Duplicates are ignored.
    #[must_use]
    pub fn kinds(mut self, kinds: &[QueryKind]) -> Self {
        self.cfg.kinds = kinds.to_vec();
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: LensConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the `Lens` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no providers are registered, no kinds are
    /// selected, or two providers share a name.
    pub fn build(mut self) -> Result<Lens, LensError> {
        if self.providers.is_empty() {
            return Err(LensError::InvalidArg(
                "no providers registered; add at least one via with_provider(...)".to_string(),
            ));
        }

        let mut kinds: Vec<QueryKind> = Vec::with_capacity(self.cfg.kinds.len());
        for k in &self.cfg.kinds {
            if !kinds.contains(k) {
                kinds.push(*k);
            }
        }
        if kinds.is_empty() {
            return Err(LensError::InvalidArg("no query kinds selected".to_string()));
        }
        self.cfg.kinds = kinds;

        let mut registry = ProviderRegistry::new();
        for p in self.providers {
            registry.register(p);
        }
        registry.check_unique_names()?;

        for (kind, names) in &self.cfg.per_kind_priority {
            registry.set_priority(*kind, names.clone());
        }
        registry.prune_priorities();
        for (kind, names) in &mut self.cfg.per_kind_priority {
            if let Some(pruned) = registry.priority(*kind) {
                *names = pruned.to_vec();
            }
        }

        Ok(Lens {
            registry,
            cfg: self.cfg,
        })
    }
}

/// Re-tag an error returned by `provider` so it always names its source.
///
/// Provider-side failures already carry a provider name and pass through;
/// anything else becomes an opaque `Provider` failure.
pub(crate) fn tag_err(provider: &str, e: LensError) -> LensError {
    match e {
        e @ (LensError::Network { .. }
        | LensError::ProviderTimeout { .. }
        | LensError::MalformedResponse { .. }
        | LensError::EmptyResult { .. }
        | LensError::Normalization { .. }
        | LensError::Provider { .. }) => e,
        other => LensError::Provider {
            provider: provider.to_string(),
            msg: other.to_string(),
        },
    }
}

impl Lens {
    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sitelens::core::provider_call_with_timeout",
            skip(fut),
            fields(
                provider = provider_name,
                kind = %kind,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        provider_name: &'static str,
        kind: QueryKind,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, LensError>
    where
        Fut: core::future::Future<Output = Result<T, LensError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(LensError::provider_timeout(provider_name, kind.as_str())))
    }

    /// Start building a new `Lens` instance.
    ///
    /// ```rust,ignore
    /// let lens = sitelens::Lens::builder()
    ///     .with_provider(cloudflare.clone())
    ///     .with_provider(google.clone())
    ///     .prefer_for_kind(QueryKind::Dns, &[google, cloudflare])
    ///     .merge_strategy_for(QueryKind::Seo, sitelens::MergeStrategy::Deep)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> LensBuilder {
        LensBuilder::new()
    }

    /// Effective configuration (priorities pruned, kinds de-duplicated).
    #[must_use]
    pub const fn config(&self) -> &LensConfig {
        &self.cfg
    }

    /// Providers serving `kind`, in execution order.
    #[must_use]
    pub fn providers_for(&self, kind: QueryKind) -> Vec<Arc<dyn LensProvider>> {
        self.registry.providers_for(kind)
    }

    pub(crate) fn timeout_for(&self, p: &dyn LensProvider) -> Duration {
        p.timeout().unwrap_or(self.cfg.provider_timeout)
    }
}
