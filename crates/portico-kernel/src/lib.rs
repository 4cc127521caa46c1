//! Portico Kernel
//!
//! Abstractions shared by every Portico component:
//!
//! - [`Port`]: the closed set of capability contracts an application can depend on
//! - [`PortContract`]: the callbacks an adapter must export to back a port
//! - [`AdapterModule`] / [`ModuleCatalog`]: adapter implementations known to the host
//! - [`Manifest`]: the validated manifest snapshot and its schema
//! - [`PortRegistry`]: the concurrent port → binding lookup table
//!
//! The manifest engine that drives these pieces lives in `portico-runtime`.

// error module
pub mod error;
pub use error::{ContractViolation, KernelError, RegistryError, ValidationError};

// port module
pub mod port;
pub use port::{Port, PortContract};

// module catalog
pub mod module;
pub use module::{AdapterModule, ModuleCatalog, StaticModule};

// manifest module
pub mod manifest;
pub use manifest::{
    AdapterDeclaration, ConfigMap, Environment, Manifest, RawDocument, Schema, validate,
    validate_strict, validate_value,
};

// registry module
pub mod registry;
pub use registry::{PortRegistry, ResolvedBinding};
