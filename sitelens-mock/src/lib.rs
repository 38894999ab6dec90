//! Stub providers with scripted behavior for exercising the resolver without
//! a network.
//!
//! ```rust,ignore
//! use sitelens_mock::{StubProvider, fixtures};
//!
//! let slow = StubProvider::builder("stub-c").hangs_for(QueryKind::Hosting).build();
//! let dns = StubProvider::builder("stub-b")
//!     .returns(fixtures::dns_record("93.184.216.34"))
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sitelens_core::{LensError, LensProvider, NormalizedRecord, Query, QueryKind, RawResponse};

pub mod fixtures;

/// Scripted outcome of one `fetch` for a kind.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Return this record.
    Return(NormalizedRecord),
    /// Return a structurally valid but all-`Unknown` record.
    Empty,
    /// Fail immediately with the provided error.
    Fail(LensError),
    /// Never complete (simulate a stalled connection).
    Hang,
    /// Hand this raw payload to `normalize` unchanged.
    Raw(RawResponse),
}

/// Deterministic provider driven by per-kind [`StubBehavior`]s.
///
/// Every call to `fetch` is counted, so tests can assert which providers the
/// resolver actually invoked.
#[derive(Debug)]
pub struct StubProvider {
    name: &'static str,
    behaviors: HashMap<QueryKind, StubBehavior>,
    delay: Duration,
    timeout: Option<Duration>,
    validates_tls: bool,
    calls: AtomicUsize,
}

impl StubProvider {
    /// Start building a stub named `name`.
    #[must_use]
    pub fn builder(name: &'static str) -> StubProviderBuilder {
        StubProviderBuilder {
            name,
            behaviors: HashMap::new(),
            delay: Duration::ZERO,
            timeout: None,
            validates_tls: false,
        }
    }

    /// Number of `fetch` calls made so far, across all kinds.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LensProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Stub"
    }

    fn supports_kind(&self, kind: QueryKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn validates_target_tls(&self) -> bool {
        self.validates_tls
    }

    async fn fetch(&self, query: &Query) -> Result<RawResponse, LensError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.behaviors.get(&query.kind) {
            Some(StubBehavior::Return(r)) => Ok(RawResponse::Record(r.clone())),
            Some(StubBehavior::Empty) => Ok(RawResponse::Record(NormalizedRecord::unknown(
                query.kind,
            ))),
            Some(StubBehavior::Fail(e)) => Err(e.clone()),
            Some(StubBehavior::Hang) => std::future::pending().await,
            Some(StubBehavior::Raw(raw)) => Ok(raw.clone()),
            None => Err(LensError::unsupported(query.kind.as_str())),
        }
    }

    fn normalize(&self, _query: &Query, raw: RawResponse) -> Result<NormalizedRecord, LensError> {
        match raw {
            RawResponse::Record(r) => Ok(r),
            other => Err(LensError::normalization(
                self.name,
                format!("stub cannot normalize a {} payload", other.shape()),
            )),
        }
    }
}

/// Builder for [`StubProvider`].
#[derive(Debug)]
pub struct StubProviderBuilder {
    name: &'static str,
    behaviors: HashMap<QueryKind, StubBehavior>,
    delay: Duration,
    timeout: Option<Duration>,
    validates_tls: bool,
}

impl StubProviderBuilder {
    /// Set the behavior for `kind`, which also declares support for it.
    #[must_use]
    pub fn behavior(mut self, kind: QueryKind, behavior: StubBehavior) -> Self {
        self.behaviors.insert(kind, behavior);
        self
    }

    /// Return `record` for queries of the record's own kind.
    #[must_use]
    pub fn returns(self, record: NormalizedRecord) -> Self {
        let kind = record.kind();
        self.behavior(kind, StubBehavior::Return(record))
    }

    /// Return `record` for queries of `kind`, even if the record is of another kind.
    #[must_use]
    pub fn returns_for(self, kind: QueryKind, record: NormalizedRecord) -> Self {
        self.behavior(kind, StubBehavior::Return(record))
    }

    /// Answer `kind` with an all-`Unknown` record.
    #[must_use]
    pub fn empty_for(self, kind: QueryKind) -> Self {
        self.behavior(kind, StubBehavior::Empty)
    }

    /// Fail `kind` with `err`.
    #[must_use]
    pub fn fails_for(self, kind: QueryKind, err: LensError) -> Self {
        self.behavior(kind, StubBehavior::Fail(err))
    }

    /// Never answer `kind`.
    #[must_use]
    pub fn hangs_for(self, kind: QueryKind) -> Self {
        self.behavior(kind, StubBehavior::Hang)
    }

    /// Hand `raw` to `normalize` for `kind`.
    #[must_use]
    pub fn raw_for(self, kind: QueryKind, raw: RawResponse) -> Self {
        self.behavior(kind, StubBehavior::Raw(raw))
    }

    /// Sleep this long before every answer.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shorthand for [`delay`](Self::delay) in milliseconds.
    #[must_use]
    pub const fn delay_ms(self, ms: u64) -> Self {
        self.delay(Duration::from_millis(ms))
    }

    /// Advertise a provider-specific timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Behave like a direct client that validates the target's certificate.
    #[must_use]
    pub const fn validates_tls(mut self) -> Self {
        self.validates_tls = true;
        self
    }

    /// Finish the stub.
    #[must_use]
    pub fn build(self) -> Arc<StubProvider> {
        Arc::new(StubProvider {
            name: self.name,
            behaviors: self.behaviors,
            delay: self.delay,
            timeout: self.timeout,
            validates_tls: self.validates_tls,
            calls: AtomicUsize::new(0),
        })
    }
}
