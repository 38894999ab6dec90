//! sitelens-core
//!
//! Core traits and utilities shared across the sitelens workspace.
//!
//! - `provider`: the `LensProvider` trait and the `RawResponse` shapes a
//!   provider may hand to its own normalization step.
//! - `registry`: the `ProviderRegistry`, which answers "which providers, in
//!   what order, for this kind".
//! - `merge`: field-wise merging of records from several providers.
//!
//! All shared data types are re-exported from `sitelens-types`.
#![warn(missing_docs)]

/// Record merging helpers used by deep resolution.
pub mod merge;
/// The provider trait and raw response shapes.
pub mod provider;
/// Per-kind provider lookup in deterministic order.
pub mod registry;

pub use merge::merge_records_by_priority;
pub use provider::{LensProvider, RawResponse};
pub use registry::ProviderRegistry;
pub use sitelens_types::*;
