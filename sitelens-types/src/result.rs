use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Field, FieldValue, LensError, NormalizedRecord, ProviderKey, QueryKind};

/// Outcome of resolving one query kind.
///
/// `source` is `Some` exactly when `succeeded` is true; the two constructors
/// are the only way to build a value, which keeps that pairing intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    record: NormalizedRecord,
    source: Option<ProviderKey>,
    succeeded: bool,
    errors: Vec<LensError>,
}

impl ResolutionResult {
    /// A successful resolution answered by `source`.
    ///
    /// `errors` holds failures from providers tried before the winner.
    #[must_use]
    pub const fn resolved(
        record: NormalizedRecord,
        source: ProviderKey,
        errors: Vec<LensError>,
    ) -> Self {
        Self {
            record,
            source: Some(source),
            succeeded: true,
            errors,
        }
    }

    /// An unsuccessful resolution: the default record for `kind`.
    #[must_use]
    pub fn exhausted(kind: QueryKind, errors: Vec<LensError>) -> Self {
        Self {
            record: NormalizedRecord::unknown(kind),
            source: None,
            succeeded: false,
            errors,
        }
    }

    /// The normalized record (all `Unknown` when unsuccessful).
    #[must_use]
    pub const fn record(&self) -> &NormalizedRecord {
        &self.record
    }

    /// Consume the result, returning the record.
    #[must_use]
    pub fn into_record(self) -> NormalizedRecord {
        self.record
    }

    /// The provider whose response was accepted, if any.
    #[must_use]
    pub const fn source(&self) -> Option<ProviderKey> {
        self.source
    }

    /// Whether any provider produced an informative record.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Provider failures observed while resolving.
    #[must_use]
    pub fn errors(&self) -> &[LensError] {
        &self.errors
    }

    /// Kind of lookup this result answers.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        self.record.kind()
    }
}

/// Results of several concurrently resolved kinds for one target.
///
/// Collection is append-only: once a kind has settled, later inserts for the
/// same kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    results: BTreeMap<QueryKind, ResolutionResult>,
}

impl AggregateResult {
    /// Empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the settled result for its kind.
    ///
    /// Returns `false` (and keeps the existing entry) if the kind had already settled.
    pub fn insert(&mut self, result: ResolutionResult) -> bool {
        let kind = result.kind();
        if self.results.contains_key(&kind) {
            return false;
        }
        self.results.insert(kind, result);
        true
    }

    /// Result for `kind`, if it was requested.
    #[must_use]
    pub fn get(&self, kind: QueryKind) -> Option<&ResolutionResult> {
        self.results.get(&kind)
    }

    /// Whether `kind` has a settled entry.
    #[must_use]
    pub fn contains(&self, kind: QueryKind) -> bool {
        self.results.contains_key(&kind)
    }

    /// Value of `field`, reading `Unknown` when its kind is absent.
    #[must_use]
    pub fn field(&self, field: Field) -> &FieldValue {
        static UNKNOWN: FieldValue = FieldValue::Unknown;
        self.results
            .get(&field.kind())
            .map_or(&UNKNOWN, |r| r.record().get(field))
    }

    /// Settled kinds in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = QueryKind> + '_ {
        self.results.keys().copied()
    }

    /// Iterate settled results in canonical kind order.
    pub fn iter(&self) -> impl Iterator<Item = (QueryKind, &ResolutionResult)> {
        self.results.iter().map(|(k, v)| (*k, v))
    }

    /// Number of settled kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no kind has settled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of kinds that resolved successfully.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.results.values().filter(|r| r.succeeded()).count()
    }
}

/// Progress notification emitted when one resolver settles.
///
/// Purely observational; dropping or ignoring events never changes results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageEvent {
    /// 1-based position of this event in settle order.
    pub index: usize,
    /// Total number of kinds in the aggregate.
    pub total: usize,
    /// Kind that settled.
    pub kind: QueryKind,
    /// Whether it resolved successfully.
    pub succeeded: bool,
    /// Provider that answered, if any.
    pub source: Option<ProviderKey>,
}
