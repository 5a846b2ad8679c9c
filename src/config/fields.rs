//! Canonical field representation.
//!
//! A configuration value is flattened into a one-level JSON object (field name
//! to value) by serializing it through `serde_json::Value`. Nested structures
//! stay opaque single values. The same round trip in reverse rebuilds the
//! typed value, so no per-type reflection code is needed.

use crate::error::SerializationError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Mapping from canonical field name to value.
pub type Fields = Map<String, Value>;

/// Flatten a typed value into its canonical fields.
///
/// Fails with [`SerializationError::NotARecord`] if the value does not
/// serialize to a JSON object (scalars, sequences, unit structs).
///
/// # Example
/// ```
/// use fieldwise::config::to_fields;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Server { host: String, port: u16 }
///
/// let fields = to_fields(&Server { host: "localhost".into(), port: 8080 }).unwrap();
/// assert_eq!(fields["host"], "localhost");
/// assert_eq!(fields["port"], 8080);
/// ```
pub fn to_fields<T: Serialize + ?Sized>(value: &T) -> Result<Fields, SerializationError> {
    match serde_json::to_value(value).map_err(SerializationError::Encode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(SerializationError::NotARecord {
            kind: kind_of(&other),
        }),
    }
}

/// Rebuild a typed value from canonical fields.
pub fn to_config<T: DeserializeOwned>(fields: Fields) -> Result<T, SerializationError> {
    serde_json::from_value(Value::Object(fields)).map_err(SerializationError::Decode)
}

/// One-level overlay: keys in `top` replace keys in `base`.
///
/// Unlike a deep merge, object values are replaced whole.
pub fn overlay(mut base: Fields, top: Fields) -> Fields {
    for (field, value) in top {
        base.insert(field, value);
    }
    base
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Server {
        host: String,
        port: u16,
        tags: Vec<String>,
        limits: HashMap<String, u32>,
        proxy: Option<String>,
    }

    fn sample() -> Server {
        Server {
            host: "localhost".into(),
            port: 9000,
            tags: vec!["a".into(), "b".into()],
            limits: HashMap::from([("claims".to_string(), 5)]),
            proxy: Some("socks5://127.0.0.1".into()),
        }
    }

    #[test]
    fn test_zero_value_fields() {
        let fields = to_fields(&Server::default()).unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields["host"], json!(""));
        assert_eq!(fields["port"], json!(0));
        assert_eq!(fields["tags"], json!([]));
        assert_eq!(fields["limits"], json!({}));
        assert_eq!(fields["proxy"], Value::Null);
    }

    #[test]
    fn test_nested_values_stay_opaque() {
        let fields = to_fields(&sample()).unwrap();
        assert_eq!(fields["limits"], json!({"claims": 5}));
        assert!(!fields.contains_key("claims"));
    }

    #[test]
    fn test_round_trip() {
        let value = sample();
        let back: Server = to_config(to_fields(&value).unwrap()).unwrap();
        assert_eq!(back, value);

        let fields = to_fields(&value).unwrap();
        let again = to_fields(&to_config::<Server>(fields.clone()).unwrap()).unwrap();
        assert_eq!(again, fields);
    }

    #[test]
    fn test_non_record_rejected() {
        let err = to_fields(&42u32).unwrap_err();
        assert!(matches!(err, SerializationError::NotARecord { kind: "number" }));

        let err = to_fields(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, SerializationError::NotARecord { kind: "sequence" }));
    }

    #[test]
    fn test_decode_failure() {
        let mut fields = to_fields(&Server::default()).unwrap();
        fields.insert("port".into(), json!("not a port"));
        let err = to_config::<Server>(fields).unwrap_err();
        assert!(matches!(err, SerializationError::Decode(_)));
    }

    #[test]
    fn test_overlay_replaces_whole_values() {
        let base = to_fields(&sample()).unwrap();
        let mut top = Fields::new();
        top.insert("limits".into(), json!({"other": 1}));
        top.insert("port".into(), json!(1234));

        let merged = overlay(base, top);
        assert_eq!(merged["limits"], json!({"other": 1}));
        assert_eq!(merged["port"], json!(1234));
        assert_eq!(merged["host"], json!("localhost"));
    }
}
