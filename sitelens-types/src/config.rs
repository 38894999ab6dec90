//! Configuration types shared by the orchestrator and its callers.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::QueryKind;

/// Strategy for selecting among eligible providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Use priority order and fall back to the next provider on failure.
    #[default]
    PriorityWithFallback,
    /// Race all eligible providers concurrently and return the first success.
    Latency,
}

/// Strategy for combining records from several providers of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Stop at the first provider that returns an informative record.
    #[default]
    Fallback,
    /// Query all eligible providers concurrently and fill unknown fields from
    /// lower-priority providers. Most complete, but spends every provider's quota.
    Deep,
}

/// Global configuration for the `Lens` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Preferred provider order per kind, by provider name.
    ///
    /// Providers not listed keep registration order after the listed ones.
    /// Unknown names are dropped when the orchestrator is built.
    pub per_kind_priority: HashMap<QueryKind, Vec<String>>,
    /// Strategy for fetching from multiple providers.
    pub fetch_strategy: FetchStrategy,
    /// Merge strategy applied to kinds without an override.
    pub merge_strategy: MergeStrategy,
    /// Per-kind merge strategy overrides.
    pub per_kind_merge: HashMap<QueryKind, MergeStrategy>,
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Optional deadline for a whole aggregate. Kinds still pending when it
    /// expires are cancelled and reported as unresolved.
    pub request_timeout: Option<Duration>,
    /// Kinds an analysis resolves.
    pub kinds: Vec<QueryKind>,
}

impl LensConfig {
    /// Effective merge strategy for `kind`.
    #[must_use]
    pub fn merge_for(&self, kind: QueryKind) -> MergeStrategy {
        self.per_kind_merge
            .get(&kind)
            .copied()
            .unwrap_or(self.merge_strategy)
    }
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            per_kind_priority: HashMap::new(),
            fetch_strategy: FetchStrategy::default(),
            merge_strategy: MergeStrategy::default(),
            per_kind_merge: HashMap::new(),
            provider_timeout: Duration::from_secs(5),
            request_timeout: None,
            kinds: QueryKind::ALL.to_vec(),
        }
    }
}
