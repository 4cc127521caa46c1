//! Manifest document loading
//!
//! Runs the front half of the pipeline: read → expand environment
//! placeholders → parse → validate. Resolution is left to the
//! [`AdapterResolver`](crate::AdapterResolver).
//!
//! Both formats parse into the same `serde_json::Value` tree. The tree only
//! holds what a JSON document could hold: mapping keys are strings, numbers
//! are finite, and a key appears at most once per mapping. Documents that
//! break these rules are rejected rather than coerced.

use crate::env::expand_with;
use crate::error::{ManifestError, ManifestResult};
use portico_kernel::{Manifest, validate_value};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Serialization format of a manifest document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Detect the format from the file extension.
    ///
    /// - YAML: `.yaml`, `.yml`
    /// - JSON: `.json`
    pub fn from_path(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ManifestError::UnsupportedFormat(format!(
                    "no file extension on `{}`",
                    path.display()
                ))
            })?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(ManifestError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Reads and validates manifest documents.
pub struct ManifestLoader;

impl ManifestLoader {
    /// Expand placeholders from the process environment and parse `text`
    /// into a raw tree.
    pub fn parse(text: &str, format: DocumentFormat) -> ManifestResult<Value> {
        Self::parse_with(text, format, |name| std::env::var(name).ok())
    }

    /// Same as [`parse`](Self::parse) with placeholders resolved by `lookup`.
    pub fn parse_with<F>(text: &str, format: DocumentFormat, lookup: F) -> ManifestResult<Value>
    where
        F: Fn(&str) -> Option<String>,
    {
        if text.trim().is_empty() {
            return Err(ManifestError::Empty);
        }

        let expanded = expand_with(text, lookup);
        match format {
            DocumentFormat::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(&expanded)?;
                yaml_to_tree(yaml, "")
            }
            DocumentFormat::Json => {
                let UniqueKeys(value) = serde_json::from_str(&expanded)?;
                Ok(value)
            }
        }
    }

    /// Parse and validate a manifest held in memory.
    pub fn from_str(text: &str, format: DocumentFormat) -> ManifestResult<Manifest> {
        let raw = Self::parse(text, format)?;
        Ok(validate_value(raw)?)
    }

    /// Read, parse and validate a manifest file.
    pub async fn from_path(path: impl AsRef<Path>) -> ManifestResult<Manifest> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let text = fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source: Arc::new(source),
            })?;
        debug!(path = %path.display(), bytes = text.len(), ?format, "Read manifest document");

        Self::from_str(&text, format)
    }
}

/// Convert a YAML tree, rejecting what JSON cannot represent.
fn yaml_to_tree(value: serde_yaml::Value, path: &str) -> ManifestResult<Value> {
    use serde_yaml::Value as Yaml;

    let value = match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(number) => number_to_tree(&number, path)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| yaml_to_tree(item, &format!("{path}[{index}]")))
                .collect::<ManifestResult<_>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let Yaml::String(key) = key else {
                    return Err(unsupported(
                        path,
                        format!("mapping key must be a string, found {}", yaml_kind(&key)),
                    ));
                };
                let item = yaml_to_tree(item, &child_path(path, &key))?;
                map.insert(key, item);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => {
            return Err(unsupported(
                path,
                format!("YAML tag `{}` is not supported", tagged.tag),
            ));
        }
    };
    Ok(value)
}

fn number_to_tree(number: &serde_yaml::Number, path: &str) -> ManifestResult<Value> {
    if let Some(i) = number.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = number.as_u64() {
        return Ok(Value::from(u));
    }
    number
        .as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| unsupported(path, format!("non-finite number `{number}`")))
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn unsupported(path: &str, reason: String) -> ManifestError {
    let path = if path.is_empty() { "<root>" } else { path };
    ManifestError::UnsupportedValue {
        path: path.to_string(),
        reason,
    }
}

/// A JSON tree that fails to deserialize when a mapping repeats a key.
struct UniqueKeys(Value);

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UniqueKeysVisitor).map(UniqueKeys)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom(format!("non-finite number `{v}`")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(UniqueKeys(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            let UniqueKeys(item) = access.next_value()?;
            map.insert(key, item);
        }
        Ok(Value::Object(map))
    }
}
