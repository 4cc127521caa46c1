//! Port registry
//!
//! [`PortRegistry`] maps each port to its current [`ResolvedBinding`]. It is
//! the only structure the rest of the application reads at runtime.
//!
//! Readers never block each other. Writes are serialized, and
//! [`PortRegistry::publish`] swaps the whole binding set under one write
//! lock, so a reader sees either the complete previous set or the complete
//! new one.

use crate::error::RegistryError;
use crate::manifest::ConfigMap;
use crate::module::AdapterModule;
use crate::port::Port;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A port's resolved `(module, config)` pair.
#[derive(Clone)]
pub struct ResolvedBinding {
    module: Arc<dyn AdapterModule>,
    config: ConfigMap,
}

impl ResolvedBinding {
    pub fn new(module: Arc<dyn AdapterModule>, config: ConfigMap) -> Self {
        Self { module, config }
    }

    /// Reference string of the bound module.
    pub fn reference(&self) -> &str {
        self.module.reference()
    }

    pub fn module(&self) -> &Arc<dyn AdapterModule> {
        &self.module
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }
}

impl fmt::Debug for ResolvedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBinding")
            .field("module", &self.reference())
            .field("config", &self.config)
            .finish()
    }
}

impl PartialEq for ResolvedBinding {
    fn eq(&self, other: &Self) -> bool {
        self.reference() == other.reference() && self.config == other.config
    }
}

/// Concurrent port → binding table.
///
/// Construct one per engine (or per test) and share it with `Arc`; there is
/// no process-global instance.
#[derive(Default)]
pub struct PortRegistry {
    bindings: RwLock<HashMap<Port, ResolvedBinding>>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the binding for a port. Last write wins.
    pub fn register(&self, port: Port, binding: ResolvedBinding) {
        debug!(%port, module = binding.reference(), "Registering adapter binding");
        self.bindings.write().insert(port, binding);
    }

    /// Binding for a port, if any.
    pub fn get(&self, port: Port) -> Option<ResolvedBinding> {
        self.bindings.read().get(&port).cloned()
    }

    /// Binding for a port, failing with a named error when the port is unbound.
    ///
    /// For call sites where a missing binding is a deployment error.
    pub fn require(&self, port: Port) -> Result<ResolvedBinding, RegistryError> {
        self.get(port).ok_or(RegistryError::PortNotRegistered(port))
    }

    /// Remove a port's binding. Removing an unbound port is a no-op.
    pub fn unregister(&self, port: Port) {
        if self.bindings.write().remove(&port).is_some() {
            debug!(%port, "Unregistered adapter binding");
        }
    }

    /// Currently bound ports.
    pub fn list_ports(&self) -> BTreeSet<Port> {
        self.bindings.read().keys().copied().collect()
    }

    /// Copy of the whole binding set, taken under a single read lock.
    pub fn snapshot(&self) -> HashMap<Port, ResolvedBinding> {
        self.bindings.read().clone()
    }

    /// Replace the whole binding set in one step.
    ///
    /// Ports missing from `bindings` are unbound.
    pub fn publish(&self, bindings: impl IntoIterator<Item = (Port, ResolvedBinding)>) {
        let next: HashMap<Port, ResolvedBinding> = bindings.into_iter().collect();
        let count = next.len();
        *self.bindings.write() = next;
        debug!(count, "Published adapter bindings");
    }

    /// Remove every binding.
    pub fn clear(&self) {
        self.bindings.write().clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

impl fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortRegistry")
            .field("ports", &self.list_ports())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::StaticModule;
    use serde_json::json;
    use std::thread;

    fn binding(reference: &str, port: Port, config: serde_json::Value) -> ResolvedBinding {
        let config = match config {
            serde_json::Value::Object(map) => map,
            _ => ConfigMap::new(),
        };
        ResolvedBinding::new(
            Arc::new(StaticModule::new(reference).conforming_to(port)),
            config,
        )
    }

    #[test]
    fn test_register_and_get() {
        let registry = PortRegistry::new();
        registry.register(
            Port::VectorStore,
            binding("acme::PgVector", Port::VectorStore, json!({ "dimensions": 1536 })),
        );

        let found = registry.get(Port::VectorStore).unwrap();
        assert_eq!(found.reference(), "acme::PgVector");
        assert_eq!(found.config().get("dimensions"), Some(&json!(1536)));
    }

    #[test]
    fn test_register_overwrites() {
        let registry = PortRegistry::new();
        registry.register(Port::Llm, binding("acme::OpenAi", Port::Llm, json!({})));
        registry.register(Port::Llm, binding("acme::Ollama", Port::Llm, json!({})));

        assert_eq!(registry.get(Port::Llm).unwrap().reference(), "acme::Ollama");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unregistered_port_is_absent() {
        let registry = PortRegistry::new();
        assert!(registry.get(Port::Reranker).is_none());
    }

    #[test]
    fn test_require_unregistered_port_names_the_port() {
        let registry = PortRegistry::new();
        let err = registry.require(Port::Reranker).unwrap_err();

        assert_eq!(err, RegistryError::PortNotRegistered(Port::Reranker));
        assert!(err.to_string().contains("reranker"));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = PortRegistry::new();
        registry.unregister(Port::Tool);

        registry.register(Port::Tool, binding("acme::Search", Port::Tool, json!({})));
        registry.unregister(Port::Tool);
        registry.unregister(Port::Tool);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_ports_and_clear() {
        let registry = PortRegistry::new();
        registry.register(Port::Cache, binding("acme::Redis", Port::Cache, json!({})));
        registry.register(Port::Llm, binding("acme::OpenAi", Port::Llm, json!({})));

        assert_eq!(
            registry.list_ports(),
            BTreeSet::from([Port::Llm, Port::Cache])
        );

        registry.clear();
        assert!(registry.list_ports().is_empty());
    }

    #[test]
    fn test_publish_replaces_whole_set() {
        let registry = PortRegistry::new();
        registry.register(Port::Cache, binding("acme::Redis", Port::Cache, json!({})));

        registry.publish([(Port::Llm, binding("acme::OpenAi", Port::Llm, json!({})))]);

        assert_eq!(registry.list_ports(), BTreeSet::from([Port::Llm]));
    }

    #[test]
    fn test_readers_never_observe_mixed_sets() {
        let registry = Arc::new(PortRegistry::new());
        let old_set = || {
            vec![
                (Port::Llm, binding("old::Llm", Port::Llm, json!({}))),
                (Port::Cache, binding("old::Cache", Port::Cache, json!({}))),
            ]
        };
        let new_set = || {
            vec![
                (Port::Llm, binding("new::Llm", Port::Llm, json!({}))),
                (Port::Cache, binding("new::Cache", Port::Cache, json!({}))),
            ]
        };
        registry.publish(old_set());

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for round in 0..500 {
                    if round % 2 == 0 {
                        registry.publish(new_set());
                    } else {
                        registry.publish(old_set());
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = registry.snapshot();
                        let llm = snapshot[&Port::Llm].reference().to_string();
                        let cache = snapshot[&Port::Cache].reference().to_string();
                        let llm_gen = llm.split("::").next().unwrap().to_string();
                        let cache_gen = cache.split("::").next().unwrap().to_string();
                        assert_eq!(llm_gen, cache_gen, "observed a torn binding set");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
