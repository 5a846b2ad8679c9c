//! File provider for JSON and YAML documents.

use super::{Candidate, Provider, decode_partial};
use crate::config::{Config, Fields, to_fields};
use anyhow::{Context, anyhow, bail};
use serde_json::Value;
use std::fmt;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Detect the format from the file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    fn parse(self, content: &str) -> anyhow::Result<Value> {
        match self {
            Format::Json => Ok(serde_json::from_str(content)?),
            Format::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
        }
    }
}

/// Reads configuration from a JSON or YAML file.
///
/// Top-level keys are matched against canonical field names; unknown keys
/// are ignored. A value that doesn't decode into its field is reported as an
/// invalid field rather than failing the whole file.
pub struct File<T> {
    name: String,
    path: PathBuf,
    format: Option<Format>,
    required: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> File<T> {
    /// A file that must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "file".to_string(),
            path: path.into(),
            format: None,
            required: true,
            _marker: PhantomData,
        }
    }

    /// A file that supplies nothing when it doesn't exist.
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            required: false,
            ..Self::new(path)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override extension-based format detection.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> anyhow::Result<Option<Fields>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound && !self.required => {
                debug!(provider = %self.name, path = %self.path.display(), "optional file not found");
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("could not read file {}", self.path.display()));
            }
        };

        let format = self
            .format
            .or_else(|| Format::from_path(&self.path))
            .ok_or_else(|| anyhow!("can not detect config format of {}", self.path.display()))?;

        let document = format
            .parse(&content)
            .with_context(|| format!("could not parse {} as {}", self.path.display(), format))?;

        match document {
            Value::Object(fields) => Ok(Some(fields)),
            // An empty YAML document parses as null.
            Value::Null => Ok(Some(Fields::new())),
            _ => bail!(
                "expected a mapping at the top level of {}",
                self.path.display()
            ),
        }
    }
}

impl<T> fmt::Debug for File<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("format", &self.format)
            .field("required", &self.required)
            .finish()
    }
}

impl<T: Config> Provider<T> for File<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> anyhow::Result<Candidate<T>> {
        let Some(document) = self.read_document()? else {
            return Ok(Candidate::new(T::default()).with_present(Vec::<String>::new()));
        };

        let zero = to_fields(&T::default())?;
        let mut partial = Fields::new();
        for (key, value) in document {
            if zero.contains_key(&key) {
                partial.insert(key, value);
            } else {
                debug!(provider = %self.name, %key, "ignoring unknown key");
            }
        }

        let present: Vec<String> = partial.keys().cloned().collect();
        let (value, invalid) = decode_partial::<T>(&zero, partial)?;
        Ok(Candidate::new(value)
            .with_invalid(invalid)
            .with_present(present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Service {
        url: String,
        timeout_secs: u64,
        tags: Vec<String>,
    }

    impl Config for Service {}

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/config.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("config.YML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("config.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("config.toml")), None);
        assert_eq!(Format::from_path(Path::new("config")), None);
    }

    #[test]
    fn test_load_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"url": "https://example.com", "timeout_secs": 11}"#).unwrap();

        let candidate = File::<Service>::new(&path).config().unwrap();
        assert_eq!(candidate.value.url, "https://example.com");
        assert_eq!(candidate.value.timeout_secs, 11);
        assert!(candidate.value.tags.is_empty());
        assert_eq!(candidate.present.unwrap().len(), 2);
    }

    #[test]
    fn test_load_yaml_ignores_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
url: https://example.com
tags: [a, b]
unrelated: true
"#,
        )
        .unwrap();

        let candidate = File::<Service>::new(&path).config().unwrap();
        assert_eq!(candidate.value.tags, vec!["a", "b"]);
        assert!(!candidate.present.unwrap().contains("unrelated"));
    }

    #[test]
    fn test_bad_field_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "url: https://example.com\ntimeout_secs: forever\n").unwrap();

        let candidate = File::<Service>::new(&path).config().unwrap();
        assert_eq!(candidate.value.url, "https://example.com");
        assert!(candidate.invalid.has_field("timeout_secs"));
    }

    #[test]
    fn test_missing_required_file_fails() {
        let temp = TempDir::new().unwrap();
        let err = File::<Service>::new(temp.path().join("absent.json"))
            .config()
            .unwrap_err();
        assert!(err.to_string().contains("could not read file"));
    }

    #[test]
    fn test_missing_optional_file_supplies_nothing() {
        let temp = TempDir::new().unwrap();
        let candidate = File::<Service>::optional(temp.path().join("absent.json"))
            .config()
            .unwrap();
        assert_eq!(candidate.value, Service::default());
        assert!(candidate.present.unwrap().is_empty());
    }

    #[test]
    fn test_non_mapping_document_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(File::<Service>::new(&path).config().is_err());
    }

    #[test]
    fn test_unknown_extension_needs_explicit_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.conf");
        std::fs::write(&path, r#"{"url": "http://x"}"#).unwrap();

        assert!(File::<Service>::new(&path).config().is_err());
        let candidate = File::<Service>::new(&path)
            .with_format(Format::Json)
            .config()
            .unwrap();
        assert_eq!(candidate.value.url, "http://x");
    }
}
