//! Layered, field-level configuration resolution.
//!
//! Configuration is assembled from an ordered list of providers (static
//! values, closures, environment variables, files). Each field is taken from
//! the highest-priority provider that supplies it, and every provider failure
//! is recorded by name for later diagnosis instead of aborting the resolve.
//!
//! ```
//! use fieldwise::config::{Config, Loader};
//! use fieldwise::error::{FieldError, FieldErrors};
//! use fieldwise::provider::{Env, Static};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Settings {
//!     url: String,
//!     timeout_secs: u64,
//! }
//!
//! impl Config for Settings {
//!     fn validate(&self) -> Result<(), FieldErrors> {
//!         let mut errors = FieldErrors::new();
//!         if !self.url.starts_with("http") {
//!             errors.add(FieldError::new("url", &self.url, "must start with http"));
//!         }
//!         errors.into_result()
//!     }
//! }
//!
//! let mut loader = Loader::from_provider(
//!     Env::new().with_prefix("MYAPP_").with_lookup(|_: &str| None),
//! )
//! .with_defaults(Static::new(Settings {
//!     url: "https://example.com".into(),
//!     timeout_secs: 30,
//! }));
//!
//! let settings = loader.resolve().unwrap();
//! assert_eq!(settings.timeout_secs, 30);
//! assert_eq!(loader.origins().get("url"), Some("static"));
//! ```

pub mod config;
pub mod error;
pub mod provider;

pub use config::{Config, EmptyPolicy, Fields, Loader};
pub use error::{FieldError, FieldErrors, ProviderError, ProviderErrors, ResolveError};
pub use provider::{Candidate, FieldAware, Provider};
