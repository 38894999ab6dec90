use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sitelens_types::{LensError, QueryKind};

use crate::LensProvider;

/// Registered providers plus per-kind ordering preferences.
///
/// Order is deterministic: providers named in a kind's priority list come
/// first, in list order; the rest follow in registration order. Adding or
/// removing providers never requires touching resolver code.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LensProvider>>,
    priority: HashMap<QueryKind, Vec<String>>,
}

impl ProviderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registration order is the fallback ordering.
    pub fn register(&mut self, provider: Arc<dyn LensProvider>) {
        self.providers.push(provider);
    }

    /// Set the preferred provider order for `kind`, by provider name.
    pub fn set_priority(&mut self, kind: QueryKind, names: Vec<String>) {
        self.priority.insert(kind, names);
    }

    /// Current priority list for `kind`, if one is set.
    #[must_use]
    pub fn priority(&self, kind: QueryKind) -> Option<&[String]> {
        self.priority.get(&kind).map(Vec::as_slice)
    }

    /// Drop priority entries naming unregistered providers, and duplicates.
    pub fn prune_priorities(&mut self) {
        let known: HashSet<&'static str> = self.providers.iter().map(|p| p.name()).collect();
        for (_kind, names) in &mut self.priority {
            let mut seen: HashSet<String> = HashSet::new();
            names.retain(|n| {
                let keep = known.contains(n.as_str()) && seen.insert(n.clone());
                #[cfg(feature = "tracing")]
                if !keep {
                    tracing::debug!(kind = %_kind, provider = %n, "dropping priority entry");
                }
                keep
            });
        }
    }

    /// Reject registries where two providers share a name.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the first duplicate.
    pub fn check_unique_names(&self) -> Result<(), LensError> {
        let mut seen: HashSet<&'static str> = HashSet::new();
        for p in &self.providers {
            if !seen.insert(p.name()) {
                return Err(LensError::InvalidArg(format!(
                    "provider '{}' registered more than once",
                    p.name()
                )));
            }
        }
        Ok(())
    }

    /// Providers serving `kind`, in execution order.
    #[must_use]
    pub fn providers_for(&self, kind: QueryKind) -> Vec<Arc<dyn LensProvider>> {
        let mut out: Vec<(usize, Arc<dyn LensProvider>)> = self
            .providers
            .iter()
            .filter(|p| p.supports_kind(kind))
            .cloned()
            .enumerate()
            .collect();
        if let Some(pref) = self.priority.get(&kind) {
            let pos: HashMap<&str, usize> = pref
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();
            out.sort_by_key(|(orig_i, p)| {
                (pos.get(p.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
        }
        out.into_iter().map(|(_, p)| p).collect()
    }

    /// Every registered provider, in registration order.
    #[must_use]
    pub fn all(&self) -> &[Arc<dyn LensProvider>] {
        &self.providers
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl core::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("priority", &self.priority)
            .finish()
    }
}
