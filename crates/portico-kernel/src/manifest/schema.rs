//! Declarative manifest schema and validator
//!
//! The rules for the manifest and for each adapter entry are plain data
//! ([`Schema`] / [`FieldRule`]), so tooling can introspect or print them
//! without duplicating them. [`validate`] walks those rules, fills defaults,
//! and builds a [`Manifest`].

use super::{AdapterDeclaration, ConfigMap, Environment, Manifest};
use crate::error::ValidationError;
use crate::port::Port;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Expected shape of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Boolean,
    Mapping,
    /// A string restricted to a fixed set of tags
    Tag { allowed: &'static [&'static str] },
    /// A mapping from port name to an adapter entry checked against [`adapter_schema`]
    PortTable,
}

impl FieldKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Boolean => "a boolean",
            FieldKind::Mapping => "a mapping",
            FieldKind::Tag { .. } => "a string tag",
            FieldKind::PortTable => "a mapping of port names",
        }
    }

    fn check(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        match (self, value) {
            (FieldKind::String, value @ Value::String(_))
            | (FieldKind::Boolean, value @ Value::Bool(_))
            | (FieldKind::Mapping, value @ Value::Object(_)) => Ok(value),
            (FieldKind::Tag { allowed }, Value::String(tag)) => {
                if allowed.contains(&tag.as_str()) {
                    Ok(Value::String(tag))
                } else {
                    Err(ValidationError::InvalidTag {
                        field: field.to_string(),
                        value: tag,
                        allowed: allowed.to_vec(),
                    })
                }
            }
            (FieldKind::PortTable, Value::Object(table)) => check_port_table(field, table),
            (kind, other) => Err(ValidationError::InvalidType {
                field: field.to_string(),
                expected: kind.describe(),
                found: kind_name(&other),
            }),
        }
    }
}

/// A single field rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Value filled in when an optional field is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub doc: &'static str,
}

impl FieldRule {
    fn required(key: &'static str, kind: FieldKind, doc: &'static str) -> Self {
        Self {
            key,
            kind,
            required: true,
            default: None,
            doc,
        }
    }

    fn optional(key: &'static str, kind: FieldKind, default: Option<Value>, doc: &'static str) -> Self {
        Self {
            key,
            kind,
            required: false,
            default,
            doc,
        }
    }
}

/// An ordered set of field rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub name: &'static str,
    pub fields: Vec<FieldRule>,
}

impl Schema {
    pub fn field(&self, key: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.key == key)
    }

    /// Check `input` against the rules and fill defaults.
    ///
    /// Null values count as absent. Keys without a rule are dropped.
    /// `prefix` is the dotted path of `input` inside the document and is only
    /// used to name fields in errors.
    pub fn normalize(&self, mut input: ConfigMap, prefix: &str) -> Result<ConfigMap, ValidationError> {
        let mut normalized = ConfigMap::new();

        for rule in &self.fields {
            let field = join_path(prefix, rule.key);
            match input.remove(rule.key).filter(|value| !value.is_null()) {
                Some(value) => {
                    normalized.insert(rule.key.to_string(), rule.kind.check(&field, value)?);
                }
                None if rule.required => {
                    return Err(ValidationError::MissingField { field });
                }
                None => {
                    if let Some(default) = &rule.default {
                        normalized.insert(rule.key.to_string(), default.clone());
                    }
                }
            }
        }

        if !input.is_empty() {
            let ignored: Vec<&String> = input.keys().collect();
            debug!(schema = self.name, path = prefix, ?ignored, "Ignoring keys without a schema rule");
        }

        Ok(normalized)
    }
}

/// Top-level manifest schema.
pub fn manifest_schema() -> Schema {
    Schema {
        name: "manifest",
        fields: vec![
            FieldRule::required("version", FieldKind::String, "Manifest version string"),
            FieldRule::required(
                "environment",
                FieldKind::Tag {
                    allowed: Environment::TAGS,
                },
                "Deployment environment tag",
            ),
            FieldRule::required(
                "adapters",
                FieldKind::PortTable,
                "Adapter declaration per port",
            ),
            FieldRule::optional(
                "pipelines",
                FieldKind::Mapping,
                Some(Value::Object(ConfigMap::new())),
                "Pipeline definitions, passed through untouched",
            ),
            FieldRule::optional(
                "graphs",
                FieldKind::Mapping,
                Some(Value::Object(ConfigMap::new())),
                "Graph definitions, passed through untouched",
            ),
            FieldRule::optional(
                "telemetry",
                FieldKind::Mapping,
                Some(Value::Object(ConfigMap::new())),
                "Telemetry settings, passed through untouched",
            ),
        ],
    }
}

/// Schema of one entry under `adapters`.
///
/// `adapter` is optional here: a missing reference is reported
/// by the resolver as `AdapterNotSpecified`, not as a schema violation.
pub fn adapter_schema() -> Schema {
    Schema {
        name: "adapter",
        fields: vec![
            FieldRule::optional(
                "adapter",
                FieldKind::String,
                None,
                "Reference of the adapter module backing the port",
            ),
            FieldRule::optional(
                "config",
                FieldKind::Mapping,
                Some(Value::Object(ConfigMap::new())),
                "Adapter configuration, passed verbatim",
            ),
            FieldRule::optional(
                "enabled",
                FieldKind::Boolean,
                Some(Value::Bool(true)),
                "Disabled ports are parsed but never bound",
            ),
        ],
    }
}

/// Raw manifest input: an ordered key-value sequence or a mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Pairs(Vec<(String, Value)>),
    Mapping(ConfigMap),
}

impl RawDocument {
    fn into_mapping(self) -> Result<ConfigMap, ValidationError> {
        match self {
            RawDocument::Mapping(map) => Ok(map),
            RawDocument::Pairs(pairs) => {
                let mut map = ConfigMap::new();
                for (key, value) in pairs {
                    if map.contains_key(&key) {
                        return Err(ValidationError::DuplicateKey { field: key });
                    }
                    map.insert(key, value);
                }
                Ok(map)
            }
        }
    }
}

impl From<ConfigMap> for RawDocument {
    fn from(map: ConfigMap) -> Self {
        RawDocument::Mapping(map)
    }
}

impl From<Vec<(String, Value)>> for RawDocument {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        RawDocument::Pairs(pairs)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawDocument {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        RawDocument::Pairs(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Validate a raw document and build a [`Manifest`] with defaults filled in.
///
/// Side-effect free: nothing is resolved or registered.
pub fn validate(raw: impl Into<RawDocument>) -> Result<Manifest, ValidationError> {
    let root = raw.into().into_mapping()?;
    let normalized = manifest_schema().normalize(root, "")?;
    build_manifest(normalized)
}

/// Validate any JSON value; non-mapping roots are rejected.
pub fn validate_value(value: Value) -> Result<Manifest, ValidationError> {
    match value {
        Value::Object(map) => validate(map),
        other => Err(ValidationError::NotAMapping {
            found: kind_name(&other),
        }),
    }
}

/// Same as [`validate`] for call sites where an invalid manifest is a bug.
///
/// # Panics
///
/// Panics with the validation error if the document is invalid.
pub fn validate_strict(raw: impl Into<RawDocument>) -> Manifest {
    match validate(raw) {
        Ok(manifest) => manifest,
        Err(err) => panic!("invalid manifest: {err}"),
    }
}

fn check_port_table(field: &str, table: ConfigMap) -> Result<Value, ValidationError> {
    let entry_schema = adapter_schema();
    let mut checked = ConfigMap::new();

    for (name, entry) in table {
        if name.parse::<Port>().is_err() {
            return Err(ValidationError::UnknownPort { name });
        }
        let entry_path = join_path(field, &name);
        let entry = match entry {
            Value::Object(entry) => entry,
            other => {
                return Err(ValidationError::InvalidType {
                    field: entry_path,
                    expected: FieldKind::Mapping.describe(),
                    found: kind_name(&other),
                });
            }
        };
        let normalized = entry_schema.normalize(entry, &entry_path)?;
        checked.insert(name, Value::Object(normalized));
    }

    Ok(Value::Object(checked))
}

/// Build the typed manifest from a map `Schema::normalize` has already
/// checked. Every field is still read with its type checked; a mismatch here
/// is reported, never defaulted.
pub(super) fn build_manifest(mut map: ConfigMap) -> Result<Manifest, ValidationError> {
    let version = take_string(&mut map, "", "version")?.ok_or_else(|| missing("version"))?;
    let tag = take_string(&mut map, "", "environment")?.ok_or_else(|| missing("environment"))?;
    let environment = tag
        .parse::<Environment>()
        .map_err(|_| ValidationError::InvalidTag {
            field: "environment".to_string(),
            value: tag.clone(),
            allowed: Environment::TAGS.to_vec(),
        })?;

    let mut adapters = BTreeMap::new();
    let table = map.remove("adapters").ok_or_else(|| missing("adapters"))?;
    for (name, entry) in expect_mapping("adapters", table)? {
        let port = name
            .parse::<Port>()
            .map_err(|_| ValidationError::UnknownPort { name: name.clone() })?;
        let entry_path = join_path("adapters", &name);
        let mut entry = expect_mapping(&entry_path, entry)?;
        let declaration = AdapterDeclaration {
            adapter: take_string(&mut entry, &entry_path, "adapter")?,
            config: take_mapping(&mut entry, &entry_path, "config")?,
            enabled: take_bool(&mut entry, &entry_path, "enabled")?.unwrap_or(true),
        };
        adapters.insert(port, declaration);
    }

    Ok(Manifest {
        version,
        environment,
        adapters,
        pipelines: take_mapping(&mut map, "", "pipelines")?,
        graphs: take_mapping(&mut map, "", "graphs")?,
        telemetry: take_mapping(&mut map, "", "telemetry")?,
    })
}

/// Remove `key`, treating null as absent.
fn take(map: &mut ConfigMap, key: &str) -> Option<Value> {
    map.remove(key).filter(|value| !value.is_null())
}

fn take_string(map: &mut ConfigMap, prefix: &str, key: &str) -> Result<Option<String>, ValidationError> {
    match take(map, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::InvalidType {
            field: join_path(prefix, key),
            expected: FieldKind::String.describe(),
            found: kind_name(&other),
        }),
    }
}

fn take_bool(map: &mut ConfigMap, prefix: &str, key: &str) -> Result<Option<bool>, ValidationError> {
    match take(map, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(ValidationError::InvalidType {
            field: join_path(prefix, key),
            expected: FieldKind::Boolean.describe(),
            found: kind_name(&other),
        }),
    }
}

fn take_mapping(map: &mut ConfigMap, prefix: &str, key: &str) -> Result<ConfigMap, ValidationError> {
    match take(map, key) {
        None => Ok(ConfigMap::new()),
        Some(value) => expect_mapping(&join_path(prefix, key), value),
    }
}

fn expect_mapping(field: &str, value: Value) -> Result<ConfigMap, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: FieldKind::Mapping.describe(),
            found: kind_name(&other),
        }),
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::MissingField {
        field: field.to_string(),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Human name of a JSON value's shape.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
