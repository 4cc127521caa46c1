//! Manifest data model
//!
//! A [`Manifest`] is only ever built by [`validate`], so holding one means
//! the document passed the schema. The engine never exposes a partially
//! validated manifest.

use crate::error::KernelError;
use crate::port::Port;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod schema;
pub use schema::{
    FieldKind, FieldRule, RawDocument, Schema, adapter_schema, manifest_schema, validate,
    validate_strict, validate_value,
};

/// Free-form configuration mapping passed verbatim to adapters.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Deployment environment a manifest targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    /// Every tag accepted in a manifest, aliases included.
    pub const TAGS: &'static [&'static str] =
        &["dev", "development", "test", "staging", "prod", "production"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(KernelError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Per-port adapter declaration, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterDeclaration {
    /// Module reference. `None` when the manifest omits the key, which is a
    /// resolution error distinct from an unknown reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    /// Passed verbatim to the adapter
    pub config: ConfigMap,
    /// Disabled ports are kept in the manifest but never bound
    pub enabled: bool,
}

impl AdapterDeclaration {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: Some(adapter.into()),
            config: ConfigMap::new(),
            enabled: true,
        }
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A validated manifest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub version: String,
    pub environment: Environment,
    pub adapters: BTreeMap<Port, AdapterDeclaration>,
    pub pipelines: ConfigMap,
    pub graphs: ConfigMap,
    pub telemetry: ConfigMap,
}

impl Manifest {
    /// Declaration for a port, enabled or not.
    pub fn adapter(&self, port: Port) -> Option<&AdapterDeclaration> {
        self.adapters.get(&port)
    }

    /// Ports whose declarations are enabled.
    pub fn enabled_ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.adapters
            .iter()
            .filter(|(_, declaration)| declaration.enabled)
            .map(|(port, _)| *port)
    }
}
