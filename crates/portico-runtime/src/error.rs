//! Error types for manifest loading, resolution and the engine.

use portico_kernel::{ContractViolation, Port, ValidationError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why a single port could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolutionFailure {
    /// The declaration has no `adapter` key.
    #[error("no adapter specified")]
    AdapterNotSpecified,

    /// The reference is not in the module catalog.
    #[error("adapter module `{0}` not found")]
    ModuleNotFound(String),

    /// The module exists but does not satisfy the port contract.
    #[error("contract mismatch: {0}")]
    ContractMismatch(ContractViolation),
}

/// A resolution failure tagged with the port it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("port `{port}`: {reason}")]
pub struct ResolutionError {
    pub port: Port,
    pub reason: ResolutionFailure,
}

impl ResolutionError {
    pub fn new(port: Port, reason: ResolutionFailure) -> Self {
        Self { port, reason }
    }
}

/// Everything that can go wrong turning a manifest document into bindings.
///
/// Cloneable so rejected loads can be broadcast in a
/// [`ReloadEvent`](crate::ReloadEvent); non-cloneable sources are shared.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("failed to read manifest `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(String),

    #[error("manifest document is empty")]
    Empty,

    #[error("malformed YAML manifest: {0}")]
    Yaml(#[source] Arc<serde_yaml::Error>),

    #[error("malformed JSON manifest: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    /// The document parsed but holds a value a manifest tree cannot carry
    /// (non-string key, non-finite number, YAML tag).
    #[error("unsupported value at `{path}`: {reason}")]
    UnsupportedValue { path: String, reason: String },

    #[error("invalid manifest: {0}")]
    Validation(#[from] ValidationError),

    #[error("adapter resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
}

impl From<serde_yaml::Error> for ManifestError {
    fn from(err: serde_yaml::Error) -> Self {
        ManifestError::Yaml(Arc::new(err))
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        ManifestError::Json(Arc::new(err))
    }
}

impl ManifestError {
    /// The resolution error, if this is one.
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            ManifestError::Resolution(err) => Some(err),
            _ => None,
        }
    }

    /// The validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ManifestError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors returned by the [`ManifestEngine`](crate::ManifestEngine).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Loading, validating or resolving the manifest failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// `reload` was called before any manifest path was established.
    #[error("no manifest path has been established")]
    NoManifestPath,

    /// The engine's actor task is no longer running.
    #[error("manifest engine `{0}` is not running")]
    Stopped(String),
}

impl EngineError {
    /// The underlying manifest error, if any.
    pub fn manifest_error(&self) -> Option<&ManifestError> {
        match self {
            EngineError::Manifest(err) => Some(err),
            _ => None,
        }
    }
}

/// Result alias for manifest pipeline operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
