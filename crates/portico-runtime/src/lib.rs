//! Portico Runtime
//!
//! The stateful half of Portico: loads manifests, resolves adapters against
//! their port contracts, and publishes the bindings so application code can
//! look them up through a [`PortRegistry`](portico_kernel::PortRegistry).
//!
//! Pipeline for every load and reload:
//!
//! ```text
//! read file → expand ${VAR} → parse → validate → resolve all ports → publish
//! ```
//!
//! Any failure before the publish step leaves the previous manifest and
//! bindings untouched.

pub mod engine;
pub mod env;
pub mod error;
pub mod loader;
pub mod resolver;

pub use engine::{
    EngineOptions, EngineState, EngineStatus, ManifestDiff, ManifestEngine, ReloadEvent,
};
pub use error::{
    EngineError, EngineResult, ManifestError, ManifestResult, ResolutionError, ResolutionFailure,
};
pub use loader::{DocumentFormat, ManifestLoader};
pub use resolver::{AdapterResolver, Resolution};
