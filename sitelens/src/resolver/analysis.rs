use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sitelens_core::{
    AggregateResult, Field, LensError, LensProvider, QueryKind, StageEvent, Target,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::core::Lens;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Identity and start time of one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisContext {
    /// `analysis_<unix-millis>_<9 base36 chars>`.
    pub id: String,
    /// Validated website being analyzed.
    pub target: Target,
    /// When the analysis started.
    pub started_at: DateTime<Utc>,
}

impl AnalysisContext {
    /// Start a new analysis of `target` now.
    #[must_use]
    pub fn new(target: Target) -> Self {
        let started_at = Utc::now();
        Self {
            id: analysis_id(started_at),
            target,
            started_at,
        }
    }
}

fn analysis_id(at: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("analysis_{}_{suffix}", at.timestamp_millis())
}

/// A finished analysis: its context plus one result per requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Identity of the request.
    pub context: AnalysisContext,
    /// Per-kind resolution results.
    pub results: AggregateResult,
    /// When the last kind settled.
    pub finished_at: DateTime<Utc>,
    /// Whether the target was reached over a certificate-validated TLS
    /// connection, as opposed to through a proxy or third-party service.
    pub tls_verified: bool,
}

impl Analysis {
    /// Wall-clock duration of the analysis.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.context.started_at
    }
}

impl Lens {
    /// Validate `url` and resolve every configured kind for it.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `url` is not an absolute http/https URL. No
    /// provider is contacted in that case. Provider failures never surface
    /// here; they degrade individual kinds to unknown values.
    pub async fn analyze(&self, url: &str) -> Result<Analysis, LensError> {
        self.analyze_inner(url, None).await
    }

    /// Like [`analyze`](Self::analyze), sending a [`StageEvent`] per settled kind.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `url` is not an absolute http/https URL.
    pub async fn analyze_with_progress(
        &self,
        url: &str,
        progress: UnboundedSender<StageEvent>,
    ) -> Result<Analysis, LensError> {
        self.analyze_inner(url, Some(&progress)).await
    }

    async fn analyze_inner(
        &self,
        url: &str,
        progress: Option<&UnboundedSender<StageEvent>>,
    ) -> Result<Analysis, LensError> {
        let context = AnalysisContext::new(Target::parse(url)?);
        #[cfg(feature = "tracing")]
        tracing::info!(id = %context.id, url = %context.target, "analysis started");
        let results = self
            .aggregate_inner(&context.target, &self.cfg.kinds, progress)
            .await;
        let finished_at = Utc::now();
        let tls_verified = context.target.is_https() && self.reached_with_tls(&results);
        #[cfg(feature = "tracing")]
        tracing::info!(
            id = %context.id,
            resolved = results.succeeded_count(),
            total = results.len(),
            "analysis finished"
        );
        Ok(Analysis {
            context,
            results,
            finished_at,
            tls_verified,
        })
    }

    /// The target answered and the accepted `Reachability` source talked to it
    /// directly with certificate validation.
    fn reached_with_tls(&self, results: &AggregateResult) -> bool {
        let Some(source) = results
            .get(QueryKind::Reachability)
            .and_then(|r| r.source())
        else {
            return false;
        };
        results.field(Field::Accessible).as_flag() == Some(true)
            && self
                .registry
                .all()
                .iter()
                .any(|p| p.key() == source && p.validates_target_tls())
    }
}
