//! Field-level configuration resolution.
//!
//! A configuration type is flattened into canonical fields (one level of
//! `serde_json::Value`s keyed by field name). The [`Loader`] asks its
//! providers in priority order and fills each field from the first provider
//! that supplies a non-empty, non-rejected value for it.
//!
//! ## Merge Strategy
//! - Fields are resolved atomically: nested values are replaced whole
//! - A resolved field is never overwritten by a lower-priority provider
//! - Fields a provider rejects (via `Candidate::invalid`) are left for the next one
//! - Once every field is resolved, remaining providers are not consulted

mod fields;
mod loader;
mod types;

pub use fields::{Fields, overlay, to_config, to_fields};
pub use loader::{EmptyPolicy, FieldOrigins, Loader};
pub use types::Config;
