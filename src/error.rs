//! Structured error types for configuration resolution.
//!
//! Three layers of failure are distinguished:
//! - [`FieldErrors`] - per-field validation failures, non-fatal to a resolve
//! - [`ProviderError`] - anything a provider reported, kept in [`ProviderErrors`]
//! - [`ResolveError`] - what `Loader::resolve` hands back to the caller

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed cause attached to a [`FieldError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Validation failure for a single named field.
#[derive(Debug)]
pub struct FieldError {
    /// Canonical field name (as it appears in the serialized form).
    pub field: String,
    /// The offending value.
    pub value: Value,
    /// Human-readable reason.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<BoxError>,
}

impl FieldError {
    /// If `value` can't be serialized, the serializer's error message is
    /// stored in its place.
    pub fn new(field: impl Into<String>, value: impl Serialize, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: serde_json::to_value(value)
                .unwrap_or_else(|err| Value::String(format!("<unserializable: {err}>"))),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a field that was required but left empty.
    pub fn empty(field: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(field, value, "must not be empty")
    }

    pub fn with_source(mut self, err: impl Into<BoxError>) -> Self {
        self.source = Some(err.into());
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {} (with val: {}): {}",
            self.field, self.value, self.message
        )
    }
}

impl StdError for FieldError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| err.as_ref() as &(dyn StdError + 'static))
    }
}

/// Accumulator of per-field validation failures.
///
/// Holds at most one [`FieldError`] per field; adding a second error for the
/// same field replaces the first. An empty set means "no error", see
/// [`FieldErrors::into_result`].
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, replacing any earlier error for the same field.
    pub fn add(&mut self, err: FieldError) -> &mut Self {
        self.errors.insert(err.field.clone(), err);
        self
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// Names of the failing fields, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise the set itself as the error.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields().collect();
        write!(f, "invalid config for fields: [{}]", names.join(", "))
    }
}

impl StdError for FieldErrors {}

impl Extend<FieldError> for FieldErrors {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        for err in iter {
            self.add(err);
        }
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = Self::new();
        errors.extend(iter);
        errors
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = btree_map::IntoValues<String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_values()
    }
}

/// Failure of the canonical field conversion. Always fatal to a resolve.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("can not convert to JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("can not convert to generic fields map: expected a record, got {kind}")]
    NotARecord { kind: &'static str },

    #[error("can not convert to target: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Error a provider raised during one resolution pass.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider supplied a value, but some of its fields were rejected.
    #[error(transparent)]
    Fields(#[from] FieldErrors),

    /// The provider failed outright and contributed nothing.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ProviderError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ProviderError::Fields(errors) => Some(errors),
            ProviderError::Failed(_) => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ProviderError::Fields(_))
    }
}

/// Registry of provider errors from the most recent resolve, keyed by provider name.
#[derive(Debug, Default)]
pub struct ProviderErrors {
    errors: BTreeMap<String, ProviderError>,
}

impl ProviderErrors {
    /// Names of the providers that reported an error.
    pub fn providers(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }

    pub fn get(&self, provider: &str) -> Option<&ProviderError> {
        self.errors.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.errors.contains_key(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderError)> {
        self.errors.iter().map(|(name, err)| (name.as_str(), err))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    // Providers sharing a name share a slot; the later one wins.
    pub(crate) fn insert(&mut self, provider: impl Into<String>, err: ProviderError) {
        self.errors.insert(provider.into(), err);
    }

    pub(crate) fn clear(&mut self) {
        self.errors.clear();
    }
}

impl fmt::Display for ProviderErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, err) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", name, err)?;
            first = false;
        }
        Ok(())
    }
}

/// Result of a failed `Loader::resolve`.
#[derive(Debug)]
pub enum ResolveError<T> {
    /// The configuration type could not be flattened or rebuilt.
    Serialization(SerializationError),

    /// Merging finished, but the merged configuration failed validation.
    /// The merged value is kept for inspection.
    Invalid { config: T, errors: FieldErrors },
}

impl<T> ResolveError<T> {
    /// The merged configuration, if merging got that far.
    pub fn config(&self) -> Option<&T> {
        match self {
            ResolveError::Invalid { config, .. } => Some(config),
            ResolveError::Serialization(_) => None,
        }
    }

    pub fn into_config(self) -> Option<T> {
        match self {
            ResolveError::Invalid { config, .. } => Some(config),
            ResolveError::Serialization(_) => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ResolveError::Invalid { errors, .. } => Some(errors),
            ResolveError::Serialization(_) => None,
        }
    }
}

impl<T> From<SerializationError> for ResolveError<T> {
    fn from(err: SerializationError) -> Self {
        ResolveError::Serialization(err)
    }
}

impl<T> fmt::Display for ResolveError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Serialization(err) => write!(f, "{}", err),
            ResolveError::Invalid { errors, .. } => {
                write!(f, "resolved configuration is invalid: {}", errors)
            }
        }
    }
}

impl<T: fmt::Debug> StdError for ResolveError<T> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ResolveError::Serialization(err) => Some(err),
            ResolveError::Invalid { errors, .. } => Some(errors),
        }
    }
}
