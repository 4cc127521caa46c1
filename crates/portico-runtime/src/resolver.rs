//! Adapter resolution
//!
//! Turns declared adapter references into contract-checked bindings.
//! Resolution only looks things up: it never touches a registry.

use crate::error::{ResolutionError, ResolutionFailure};
use portico_kernel::{AdapterDeclaration, Manifest, ModuleCatalog, Port, ResolvedBinding};
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving one port.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The port resolved to a conforming module.
    Bound(ResolvedBinding),
    /// The port is disabled; nothing is bound and nothing failed.
    Skipped,
}

/// Resolves declarations against a [`ModuleCatalog`].
#[derive(Debug, Clone)]
pub struct AdapterResolver {
    catalog: Arc<ModuleCatalog>,
}

impl AdapterResolver {
    pub fn new(catalog: Arc<ModuleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.catalog
    }

    /// Resolve a single port's declaration.
    ///
    /// Checks, in order: enabled flag, presence of a reference, presence of
    /// the module in the catalog, conformance to the port contract.
    pub fn resolve(
        &self,
        port: Port,
        declaration: &AdapterDeclaration,
    ) -> Result<Resolution, ResolutionError> {
        if !declaration.enabled {
            debug!(%port, "Port disabled, skipping resolution");
            return Ok(Resolution::Skipped);
        }

        let reference = declaration
            .adapter
            .as_deref()
            .ok_or_else(|| ResolutionError::new(port, ResolutionFailure::AdapterNotSpecified))?;

        let module = self.catalog.lookup(reference).ok_or_else(|| {
            ResolutionError::new(port, ResolutionFailure::ModuleNotFound(reference.to_string()))
        })?;

        port.contract()
            .check(module.as_ref())
            .map_err(|violation| {
                ResolutionError::new(port, ResolutionFailure::ContractMismatch(violation))
            })?;

        debug!(%port, module = reference, "Resolved adapter");
        Ok(Resolution::Bound(ResolvedBinding::new(
            module,
            declaration.config.clone(),
        )))
    }

    /// Resolve every declared port of a manifest.
    ///
    /// Stops at the first failure, in port order; disabled ports are left
    /// out of the result.
    pub fn resolve_all(
        &self,
        manifest: &Manifest,
    ) -> Result<Vec<(Port, ResolvedBinding)>, ResolutionError> {
        let mut bindings = Vec::with_capacity(manifest.adapters.len());
        for (port, declaration) in &manifest.adapters {
            if let Resolution::Bound(binding) = self.resolve(*port, declaration)? {
                bindings.push((*port, binding));
            }
        }
        Ok(bindings)
    }
}
