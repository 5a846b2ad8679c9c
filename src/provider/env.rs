//! Environment variable provider.
//!
//! Looks up one variable per canonical field. The variable name is the field
//! name passed through a case converter (SHOUTY_SNAKE_CASE by default) and
//! prefixed, e.g. field `http_timeout` with prefix `APP_` reads
//! `APP_HTTP_TIMEOUT`.

use super::{Candidate, FieldAware, Provider, decode_partial};
use crate::config::{Config, Fields, to_fields};
use heck::ToShoutySnakeCase;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

type CaseConverter = Box<dyn Fn(&str) -> String + Send + Sync>;
type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Default case converter: `HTTPConnectionTimeout` and `http_connection_timeout`
/// both become `HTTP_CONNECTION_TIMEOUT`.
pub fn shouty_snake_case(field: &str) -> String {
    field.to_shouty_snake_case()
}

/// Reads configuration fields from environment variables.
pub struct Env<T> {
    name: String,
    prefix: String,
    fields: Option<Fields>,
    convert: CaseConverter,
    lookup: Lookup,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Env<T> {
    pub fn new() -> Self {
        Self {
            name: "environment".to_string(),
            prefix: String::new(),
            fields: None,
            convert: Box::new(shouty_snake_case),
            lookup: Box::new(|name: &str| std::env::var(name).ok()),
            _marker: PhantomData,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Prepended verbatim to every converted field name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_case_converter<F>(mut self, convert: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.convert = Box::new(convert);
        self
    }

    /// Use field names as variable names, unchanged.
    pub fn no_case_conversion(self) -> Self {
        self.with_case_converter(|field: &str| field.to_string())
    }

    /// Replace the process environment with another lookup, e.g. a map in tests.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    /// The variable consulted for `field`.
    pub fn variable_name(&self, field: &str) -> String {
        format!("{}{}", self.prefix, (self.convert)(field))
    }
}

impl<T> Default for Env<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Env<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("fields", &self.fields.as_ref().map(|f| f.len()))
            .finish()
    }
}

impl<T> FieldAware for Env<T> {
    fn inject(&mut self, fields: &Fields) {
        self.fields = Some(fields.clone());
    }
}

impl<T: Config> Provider<T> for Env<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> anyhow::Result<Candidate<T>> {
        let zero = match &self.fields {
            Some(fields) => fields.clone(),
            None => to_fields(&T::default())?,
        };

        let mut partial = Fields::new();
        let mut as_text = Fields::new();
        for (field, sentinel) in &zero {
            let variable = self.variable_name(field);
            if let Some(raw) = (self.lookup)(variable.as_str()) {
                debug!(provider = %self.name, %field, %variable, "found variable");
                let parsed = parse_raw(&raw, sentinel);
                if !parsed.is_string() {
                    as_text.insert(field.clone(), Value::String(raw));
                }
                partial.insert(field.clone(), parsed);
            }
        }

        let present: Vec<String> = partial.keys().cloned().collect();
        let (mut value, mut invalid) = decode_partial::<T>(&zero, partial.clone())?;

        // Text that looks like JSON may still belong to a string field whose
        // zero value isn't a string, e.g. `Option<String>`.
        let retry: Vec<String> = invalid
            .fields()
            .filter(|field| as_text.contains_key(*field))
            .map(str::to_string)
            .collect();
        if !retry.is_empty() {
            for field in retry {
                if let Some(text) = as_text.remove(&field) {
                    partial.insert(field, text);
                }
            }
            (value, invalid) = decode_partial::<T>(&zero, partial)?;
        }

        Ok(Candidate::new(value)
            .with_invalid(invalid)
            .with_present(present))
    }

    fn field_aware(&mut self) -> Option<&mut dyn FieldAware> {
        Some(self)
    }
}

// String fields take the raw text; anything else is read as JSON first so
// numbers, booleans and lists come through typed.
fn parse_raw(raw: &str, sentinel: &Value) -> Value {
    match sentinel {
        Value::String(_) => Value::String(raw.to_string()),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}
