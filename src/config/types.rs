//! The configuration contract.

use crate::error::FieldErrors;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A configuration record that can be resolved field-by-field.
///
/// `Default` provides the zero value: its serialized fields define the
/// canonical field set, and each field's zero value is the sentinel meaning
/// "not supplied". Keep `Default` empty; a non-empty default is
/// indistinguishable from "unset" and should come from a lower-priority
/// provider instead.
///
/// ```
/// use fieldwise::config::Config;
/// use fieldwise::error::{FieldError, FieldErrors};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Repo {
///     owner: String,
///     name: String,
/// }
///
/// impl Config for Repo {
///     fn validate(&self) -> Result<(), FieldErrors> {
///         let mut errors = FieldErrors::new();
///         if self.owner.is_empty() {
///             errors.add(FieldError::empty("owner", &self.owner));
///         }
///         errors.into_result()
///     }
/// }
/// ```
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Check the record, naming each invalid field.
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}
