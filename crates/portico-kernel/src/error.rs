//! Typed errors for the kernel.
//!
//! Every error here is structured so callers can branch on which field,
//! port, or callback failed without parsing messages.

use crate::port::Port;
use thiserror::Error;

/// Schema violations found while validating a raw manifest tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The document root is not a key-value mapping.
    #[error("manifest root must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// A required field is absent (or null).
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    /// A field is present but has the wrong shape.
    #[error("field `{field}` must be {expected}, found {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A tag field holds a value outside its enumeration.
    #[error("field `{field}` has unsupported value `{value}` (expected one of {allowed:?})")]
    InvalidTag {
        field: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    /// A key under `adapters` does not name a known port.
    #[error("unknown port `{name}` under `adapters`")]
    UnknownPort { name: String },

    /// The same key appears twice in an ordered key-value input.
    #[error("duplicate key `{field}`")]
    DuplicateKey { field: String },
}

impl ValidationError {
    /// Dotted path of the field the error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAMapping { .. } => None,
            ValidationError::MissingField { field }
            | ValidationError::InvalidType { field, .. }
            | ValidationError::InvalidTag { field, .. }
            | ValidationError::DuplicateKey { field } => Some(field),
            ValidationError::UnknownPort { .. } => Some("adapters"),
        }
    }
}

/// Ways an adapter module can fail its port contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The module does not declare that it implements the port.
    #[error("module `{reference}` does not implement the `{port}` port")]
    PortNotDeclared { reference: String, port: Port },

    /// The module declares the port but lacks required callbacks.
    #[error("module `{reference}` is missing `{port}` callbacks: {missing:?}")]
    MissingCallbacks {
        reference: String,
        port: Port,
        missing: Vec<&'static str>,
    },
}

/// Errors from registry lookups that require a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("no adapter registered for port `{0}`")]
    PortNotRegistered(Port),
}

/// Miscellaneous kernel errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KernelError {
    #[error("unknown port `{0}`")]
    UnknownPort(String),

    #[error("unknown environment tag `{0}`")]
    UnknownEnvironment(String),
}
