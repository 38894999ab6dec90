// Re-export helpers so tests can `use crate::helpers::*;`
pub use sitelens_mock::{StubBehavior, StubProvider, fixtures};

use sitelens::{Query, QueryKind, Target};

pub const EXAMPLE: &str = "https://example.com";

/// Parsed `https://example.com`.
pub fn target() -> Target {
    Target::parse(EXAMPLE).unwrap()
}

/// Query of `kind` against `https://example.com`.
pub fn query(kind: QueryKind) -> Query {
    target().query(kind)
}
