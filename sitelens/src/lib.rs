//! sitelens runs independent website lookups against several data sources at
//! once and reduces them to one fixed, always-populated set of fields.
//!
//! Overview
//! - Each query kind (DNS, hosting, headers, SEO, ...) has an ordered list of
//!   providers registered through `sitelens_core::LensProvider`.
//! - The resolver tries providers in order, bounds each call with a timeout,
//!   and accepts the first informative normalized record. When every provider
//!   fails, the kind degrades to an all-`Unknown` record instead of an error.
//! - The aggregator runs one resolver per kind concurrently on the caller's
//!   task and always returns an entry for every requested kind.
//!
//! Key behaviors and trade-offs
//! - Fetch strategy:
//!   - `PriorityWithFallback`: deterministic order; cheap on rate limits, but
//!     a kind can take up to the sum of its providers' timeouts.
//!   - `Latency`: races eligible providers; lowest latency, more requests.
//! - Merge strategy (per kind):
//!   - `Fallback`: first informative record wins.
//!   - `Deep`: every provider is queried and unknown fields are backfilled
//!     from lower-priority providers.
//! - Request deadline: bounds a whole aggregate; kinds still pending are
//!   cancelled and reported as unresolved.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use sitelens::{Lens, QueryKind, SiteReport};
//!
//! let lens = Lens::builder()
//!     .with_provider(Arc::new(DohProvider::cloudflare(client.clone())))
//!     .with_provider(Arc::new(DohProvider::google(client.clone())))
//!     .kinds(&[QueryKind::Dns, QueryKind::Nameservers])
//!     .build()?;
//!
//! let analysis = lens.analyze("https://example.com").await?;
//! println!("{}", SiteReport::from_analysis(&analysis).render_text());
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod report;
mod resolver;

pub use core::{Lens, LensBuilder};
pub use report::SiteReport;
pub use resolver::analysis::{Analysis, AnalysisContext};
pub use resolver::util::collapse_errors;

pub use sitelens_core::{
    AggregateResult, FetchStrategy, Field, FieldValue, LensConfig, LensError, LensProvider,
    MergeStrategy, NormalizedRecord, ProviderKey, ProviderRegistry, Query, QueryKind, RawResponse,
    ResolutionResult, StageEvent, Target,
};
