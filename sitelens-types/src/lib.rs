//! Shared data types for the sitelens workspace.
//!
//! Everything a provider, the orchestrator, and a renderer need to agree on
//! lives here: the closed set of query kinds and their fixed field sets, the
//! normalized record shape with its explicit `Unknown` sentinel, resolution and
//! aggregate results, request targets, configuration, and the unified error.
#![warn(missing_docs)]

mod config;
mod error;
mod field;
mod kind;
mod provider_key;
mod query;
mod record;
mod result;
mod value;

pub use config::{FetchStrategy, LensConfig, MergeStrategy};
pub use error::LensError;
pub use field::Field;
pub use kind::QueryKind;
pub use provider_key::ProviderKey;
pub use query::{Query, Target};
pub use record::NormalizedRecord;
pub use result::{AggregateResult, ResolutionResult, StageEvent};
pub use value::FieldValue;
