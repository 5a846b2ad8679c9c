//! Configuration providers.
//!
//! A provider is a named source of a candidate configuration value. The
//! loader asks each provider in priority order and merges the candidates
//! field by field.
//!
//! ## Built-in providers
//! - [`Static`] - a fixed value, validated by its own `Config::validate`
//! - [`Function`] - a closure producing the value on demand
//! - [`Env`] - variable lookup keyed by converted field names (field-aware)
//! - [`File`] - a JSON or YAML document on disk

mod env;
mod file;
mod function;
mod value;

pub use env::{Env, shouty_snake_case};
pub use file::{File, Format};
pub use function::Function;
pub use value::Static;

use crate::config::{Fields, overlay, to_config};
use crate::error::{FieldError, FieldErrors, SerializationError};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

/// A named source of configuration.
///
/// `config` may fail in two ways:
/// - return `Err`: the provider contributes nothing this pass
/// - return a [`Candidate`] with a non-empty `invalid` set: every field it
///   names is skipped, the rest are merged as usual
pub trait Provider<T> {
    /// Stable name, used as the key in the provider error registry.
    fn name(&self) -> &str;

    /// Produce a best-effort candidate value.
    fn config(&self) -> anyhow::Result<Candidate<T>>;

    /// Field-injection capability, if this provider has it.
    fn field_aware(&mut self) -> Option<&mut dyn FieldAware> {
        None
    }
}

/// Capability of providers that need the canonical field set before
/// producing a value (e.g. to know which variables to look up).
pub trait FieldAware {
    /// Receives the canonical fields (names and zero values) once per
    /// resolve, before `Provider::config` is called.
    fn inject(&mut self, fields: &Fields);
}

/// A provider's output for one resolution pass.
#[derive(Debug)]
pub struct Candidate<T> {
    /// The candidate value. Zero-valued fields count as "not supplied".
    pub value: T,
    /// Fields the provider rejected; they are skipped during the merge.
    pub invalid: FieldErrors,
    /// Fields the provider explicitly supplied, if it knows. Only consulted
    /// under `EmptyPolicy::TrackPresence`.
    pub present: Option<BTreeSet<String>>,
}

impl<T> Candidate<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            invalid: FieldErrors::new(),
            present: None,
        }
    }

    pub fn with_invalid(mut self, invalid: FieldErrors) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn with_present<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.present = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> From<T> for Candidate<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Decode a partial field mapping on top of the zero fields.
///
/// Fields that can't be decoded into `T` are dropped and reported, so one bad
/// value doesn't cost the whole source.
pub(crate) fn decode_partial<T: DeserializeOwned>(
    zero: &Fields,
    partial: Fields,
) -> Result<(T, FieldErrors), SerializationError> {
    if let Ok(value) = to_config(overlay(zero.clone(), partial.clone())) {
        return Ok((value, FieldErrors::new()));
    }

    let mut accepted = Fields::new();
    let mut invalid = FieldErrors::new();
    for (field, value) in partial {
        let mut single = zero.clone();
        single.insert(field.clone(), value.clone());
        match to_config::<T>(single) {
            Ok(_) => {
                accepted.insert(field, value);
            }
            Err(err) => {
                invalid.add(FieldError::new(field, &value, "can not be decoded").with_source(err));
            }
        }
    }

    let value = to_config(overlay(zero.clone(), accepted))?;
    Ok((value, invalid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::to_fields;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Limits {
        name: String,
        max: u32,
        ratio: f64,
    }

    #[test]
    fn test_decode_partial_all_valid() {
        let zero = to_fields(&Limits::default()).unwrap();
        let partial = Fields::from_iter([("max".to_string(), json!(7))]);
        let (value, invalid) = decode_partial::<Limits>(&zero, partial).unwrap();
        assert_eq!(value.max, 7);
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_decode_partial_drops_bad_fields() {
        let zero = to_fields(&Limits::default()).unwrap();
        let partial = Fields::from_iter([
            ("name".to_string(), json!("burst")),
            ("max".to_string(), json!("lots")),
        ]);
        let (value, invalid) = decode_partial::<Limits>(&zero, partial).unwrap();
        assert_eq!(value.name, "burst");
        assert_eq!(value.max, 0);
        assert!(invalid.has_field("max"));
        assert!(!invalid.has_field("name"));
    }

    #[test]
    fn test_candidate_builders() {
        let candidate = Candidate::new(Limits::default()).with_present(["max"]);
        assert!(candidate.present.as_ref().unwrap().contains("max"));
        assert!(candidate.invalid.is_empty());

        let candidate: Candidate<Limits> = Limits::default().into();
        assert!(candidate.present.is_none());
        assert_eq!(candidate.into_value(), Limits::default());
    }
}
