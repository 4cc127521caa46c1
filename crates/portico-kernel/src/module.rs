//! Adapter modules and the catalog that locates them
//!
//! A manifest names adapters by reference string. The host application
//! decides which references exist by registering [`AdapterModule`]s in a
//! [`ModuleCatalog`]; a reference that is not in the catalog cannot be
//! bound to any port.

use crate::port::Port;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// A concrete adapter implementation known to the host.
///
/// Implementors describe which ports they back and which callbacks they
/// export. The resolver checks these against the port's
/// [`PortContract`](crate::PortContract) before binding.
///
/// # Example
///
/// ```rust
/// use portico_kernel::{AdapterModule, Port};
///
/// #[derive(Debug)]
/// struct PgVector;
///
/// impl AdapterModule for PgVector {
///     fn reference(&self) -> &str {
///         "acme::PgVector"
///     }
///
///     fn implements(&self) -> &[Port] {
///         &[Port::VectorStore]
///     }
///
///     fn exports(&self, callback: &str) -> bool {
///         matches!(callback, "upsert" | "search" | "delete")
///     }
/// }
///
/// assert!(Port::VectorStore.contract().check(&PgVector).is_ok());
/// ```
pub trait AdapterModule: Send + Sync + fmt::Debug {
    /// The reference string manifests use to select this module.
    fn reference(&self) -> &str;

    /// Ports this module claims to implement.
    fn implements(&self) -> &[Port];

    /// Whether the module exports the named callback.
    fn exports(&self, callback: &str) -> bool;
}

/// An [`AdapterModule`] described entirely by data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticModule {
    reference: String,
    ports: Vec<Port>,
    callbacks: BTreeSet<String>,
}

impl StaticModule {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ports: Vec::new(),
            callbacks: BTreeSet::new(),
        }
    }

    /// Builder: declare an implemented port.
    pub fn implementing(mut self, port: Port) -> Self {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
        self
    }

    /// Builder: add exported callbacks.
    pub fn exporting<I, S>(mut self, callbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.callbacks.extend(callbacks.into_iter().map(Into::into));
        self
    }

    /// Builder: declare a port and export exactly what its contract requires.
    pub fn conforming_to(self, port: Port) -> Self {
        self.implementing(port)
            .exporting(port.contract().callbacks.iter().copied())
    }
}

impl AdapterModule for StaticModule {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn implements(&self) -> &[Port] {
        &self.ports
    }

    fn exports(&self, callback: &str) -> bool {
        self.callbacks.contains(callback)
    }
}

/// Lookup table from reference string to adapter module.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, Arc<dyn AdapterModule>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the reference modules, one conforming module per port.
    ///
    /// Tooling uses this to check that a manifest resolves without linking
    /// the real adapters.
    pub fn with_reference_modules() -> Self {
        let mut catalog = Self::new();
        for port in Port::ALL {
            catalog.register(StaticModule::new(reference_name(port)).conforming_to(port));
        }
        catalog
    }

    /// Register a module, replacing any module with the same reference.
    pub fn register(&mut self, module: impl AdapterModule + 'static) -> &mut Self {
        self.register_arc(Arc::new(module))
    }

    /// Register an already shared module.
    pub fn register_arc(&mut self, module: Arc<dyn AdapterModule>) -> &mut Self {
        self.modules.insert(module.reference().to_string(), module);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, module: impl AdapterModule + 'static) -> Self {
        self.register(module);
        self
    }

    /// Locate a module by reference.
    pub fn lookup(&self, reference: &str) -> Option<Arc<dyn AdapterModule>> {
        self.modules.get(reference).cloned()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.modules.contains_key(reference)
    }

    /// All registered references, sorted.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        refs.sort_unstable();
        refs
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Reference string of the built-in reference module for a port.
pub fn reference_name(port: Port) -> &'static str {
    match port {
        Port::VectorStore => "portico::reference::InMemoryVectorStore",
        Port::GraphStore => "portico::reference::InMemoryGraphStore",
        Port::DocumentStore => "portico::reference::InMemoryDocumentStore",
        Port::Embedder => "portico::reference::HashEmbedder",
        Port::Llm => "portico::reference::EchoLlm",
        Port::Chunker => "portico::reference::FixedSizeChunker",
        Port::Retriever => "portico::reference::VectorRetriever",
        Port::Reranker => "portico::reference::ScoreReranker",
        Port::Router => "portico::reference::KeywordRouter",
        Port::Cache => "portico::reference::InMemoryCache",
        Port::Pipeline => "portico::reference::SequentialPipeline",
        Port::Agent => "portico::reference::EchoAgent",
        Port::Tool => "portico::reference::EchoTool",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_by_reference() {
        let catalog = ModuleCatalog::new()
            .with(StaticModule::new("acme::Redis").conforming_to(Port::Cache));

        let module = catalog.lookup("acme::Redis").unwrap();
        assert_eq!(module.reference(), "acme::Redis");
        assert_eq!(module.implements(), &[Port::Cache]);
        assert!(catalog.lookup("acme::Memcached").is_none());
    }

    #[test]
    fn test_register_replaces_same_reference() {
        let mut catalog = ModuleCatalog::new();
        catalog.register(StaticModule::new("acme::Store").conforming_to(Port::DocumentStore));
        catalog.register(StaticModule::new("acme::Store").conforming_to(Port::GraphStore));

        assert_eq!(catalog.len(), 1);
        let module = catalog.lookup("acme::Store").unwrap();
        assert_eq!(module.implements(), &[Port::GraphStore]);
    }

    #[test]
    fn test_reference_modules_conform_to_their_ports() {
        let catalog = ModuleCatalog::with_reference_modules();
        assert_eq!(catalog.len(), Port::ALL.len());

        for port in Port::ALL {
            let module = catalog.lookup(reference_name(port)).unwrap();
            assert!(port.contract().check(module.as_ref()).is_ok(), "{port}");
        }
    }

    #[test]
    fn test_implementing_same_port_twice_is_idempotent() {
        let module = StaticModule::new("acme::Tool")
            .implementing(Port::Tool)
            .implementing(Port::Tool);
        assert_eq!(module.implements(), &[Port::Tool]);
    }
}
