//! A fixed value acting as its own provider.

use super::{Candidate, Provider};
use crate::config::Config;

/// Provides a fixed configuration value.
///
/// The value is run through its own [`Config::validate`]; fields it rejects
/// are reported as invalid so that a lower-priority provider can fill them.
#[derive(Debug, Clone)]
pub struct Static<T> {
    name: String,
    value: T,
}

impl<T> Static<T> {
    pub fn new(value: T) -> Self {
        Self {
            name: "static".to_string(),
            value,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Config + Clone> Provider<T> for Static<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> anyhow::Result<Candidate<T>> {
        let candidate = Candidate::new(self.value.clone());
        Ok(match self.value.validate() {
            Ok(()) => candidate,
            Err(invalid) => candidate.with_invalid(invalid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldError, FieldErrors};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Endpoint {
        url: String,
    }

    impl Config for Endpoint {
        fn validate(&self) -> Result<(), FieldErrors> {
            let mut errors = FieldErrors::new();
            if !self.url.starts_with("http") {
                errors.add(FieldError::new("url", &self.url, "must start with http"));
            }
            errors.into_result()
        }
    }

    #[test]
    fn test_valid_value_has_no_invalid_fields() {
        let provider = Static::new(Endpoint {
            url: "https://example.com".into(),
        });
        let candidate = provider.config().unwrap();
        assert!(candidate.invalid.is_empty());
        assert_eq!(candidate.value.url, "https://example.com");
        assert_eq!(provider.name(), "static");
    }

    #[test]
    fn test_invalid_fields_reported() {
        let provider = Static::new(Endpoint {
            url: "ftp://example.com".into(),
        })
        .with_name("defaults");
        let candidate = provider.config().unwrap();
        assert!(candidate.invalid.has_field("url"));
        assert_eq!(provider.name(), "defaults");
    }
}
