//! Provider metadata types usable across crates.

use core::fmt;

use serde::Serialize;

/// Typed key identifying a provider in priority configuration and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProviderKey(pub &'static str);

impl ProviderKey {
    /// Construct a new typed provider key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<ProviderKey> for &'static str {
    fn from(k: ProviderKey) -> Self {
        k.0
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
