//! Configuration loader with field-level priority merging.
//!
//! Providers are consulted in registration order (first = highest priority).
//! Each field is taken from the first provider that supplies a non-empty value
//! for it; later providers never overwrite a resolved field.

use super::fields::{Fields, overlay, to_config, to_fields};
use super::types::Config;
use crate::error::{ProviderError, ProviderErrors, ResolveError};
use crate::provider::{Candidate, Provider};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// How a provider value equal to the field's zero value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPolicy {
    /// A zero value never resolves a field (default).
    #[default]
    ZeroIsUnset,
    /// A zero value resolves a field when the provider reports the field as
    /// explicitly present. Providers that don't track presence behave as
    /// under `ZeroIsUnset`.
    TrackPresence,
}

impl EmptyPolicy {
    fn accepts_zero(self, field: &str, present: Option<&BTreeSet<String>>) -> bool {
        match self {
            EmptyPolicy::ZeroIsUnset => false,
            EmptyPolicy::TrackPresence => present.is_some_and(|p| p.contains(field)),
        }
    }
}

/// Which provider supplied each resolved field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOrigins {
    origins: BTreeMap<String, String>,
}

impl FieldOrigins {
    /// Name of the provider that supplied `field`, if it was resolved.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.origins.get(field).map(String::as_str)
    }

    /// Fields supplied by the named provider.
    pub fn fields_from(&self, provider: &str) -> Vec<&str> {
        self.origins
            .iter()
            .filter(|(_, origin)| origin.as_str() == provider)
            .map(|(field, _)| field.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.origins
            .iter()
            .map(|(field, origin)| (field.as_str(), origin.as_str()))
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    fn insert(&mut self, field: String, provider: String) {
        self.origins.insert(field, provider);
    }

    fn clear(&mut self) {
        self.origins.clear();
    }
}

/// Resolves a `T` from an ordered list of providers.
///
/// The provider list is fixed by the builder methods; `resolve` borrows the
/// loader mutably, so one loader serves one resolve at a time. Boxed providers
/// carry no `Send` bound, so a loader stays on the thread that built it; to
/// resolve concurrently, build one loader per thread.
pub struct Loader<T> {
    providers: Vec<Box<dyn Provider<T>>>,
    empty_policy: EmptyPolicy,
    provider_errors: ProviderErrors,
    origins: FieldOrigins,
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            empty_policy: EmptyPolicy::default(),
            provider_errors: ProviderErrors::default(),
            origins: FieldOrigins::default(),
        }
    }
}

impl<T> fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("providers", &self.provider_names())
            .field("empty_policy", &self.empty_policy)
            .field("provider_errors", &self.provider_errors)
            .field("origins", &self.origins)
            .finish()
    }
}

impl<T> Loader<T> {
    /// Create a loader without providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader whose highest-priority provider is `provider`.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: Provider<T> + 'static,
    {
        Self::new().with_provider(provider)
    }

    /// Create a loader from providers in descending priority.
    pub fn from_providers(providers: impl IntoIterator<Item = Box<dyn Provider<T>>>) -> Self {
        Self::new().with_providers(providers)
    }

    /// Append a provider with lower priority than all registered ones.
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: Provider<T> + 'static,
    {
        self.providers.push(Box::new(provider));
        self
    }

    /// Append providers, each lower in priority than the one before.
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Box<dyn Provider<T>>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Append a fallback provider. Same as [`Loader::with_provider`]; reads
    /// better at the end of a chain.
    pub fn with_defaults<P>(self, provider: P) -> Self
    where
        P: Provider<T> + 'static,
    {
        self.with_provider(provider)
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn empty_policy(&self) -> EmptyPolicy {
        self.empty_policy
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Errors raised by providers during the most recent resolve.
    pub fn provider_errors(&self) -> &ProviderErrors {
        &self.provider_errors
    }

    /// Which provider supplied each field during the most recent resolve.
    pub fn origins(&self) -> &FieldOrigins {
        &self.origins
    }
}

impl<T: Config> Loader<T> {
    /// Merge all providers into a `T` and validate it.
    ///
    /// Provider failures never abort the resolve; they are recorded in
    /// [`Loader::provider_errors`]. Only a canonicalization failure or the
    /// final validation result is returned as an error.
    pub fn resolve(&mut self) -> Result<T, ResolveError<T>> {
        self.provider_errors.clear();
        self.origins.clear();

        let fields = to_fields(&T::default())?;
        let mut resolved = Fields::new();

        for provider in &mut self.providers {
            // Everything resolved: remaining providers must not be consulted.
            if resolved.len() == fields.len() {
                debug!(next = %provider.name(), "all fields resolved");
                break;
            }

            if let Some(aware) = provider.field_aware() {
                aware.inject(&fields);
            }

            let name = provider.name().to_string();
            let Candidate {
                value,
                invalid,
                present,
            } = match provider.config() {
                Ok(candidate) => candidate,
                Err(err) => {
                    warn!(provider = %name, error = %err, "provider failed, skipping");
                    self.provider_errors.insert(name, ProviderError::Failed(err));
                    continue;
                }
            };

            let supplied = to_fields(&value)?;
            let mut contributed = 0usize;
            for (field, zero) in &fields {
                if resolved.contains_key(field) || invalid.has_field(field) {
                    continue;
                }
                let Some(offered) = supplied.get(field) else {
                    continue;
                };
                if offered == zero && !self.empty_policy.accepts_zero(field, present.as_ref()) {
                    continue;
                }
                resolved.insert(field.clone(), offered.clone());
                self.origins.insert(field.clone(), name.clone());
                contributed += 1;
            }

            debug!(
                provider = %name,
                contributed,
                resolved = resolved.len(),
                total = fields.len(),
                "merged provider"
            );

            if !invalid.is_empty() {
                warn!(provider = %name, errors = %invalid, "provider rejected fields");
                self.provider_errors.insert(name, ProviderError::Fields(invalid));
            }
        }

        let config: T = to_config(overlay(fields, resolved))?;
        match config.validate() {
            Ok(()) => Ok(config),
            Err(errors) => Err(ResolveError::Invalid { config, errors }),
        }
    }
}
