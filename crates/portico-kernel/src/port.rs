//! Port enumeration and contract descriptors
//!
//! The set of ports is fixed at build time. Adding a port means adding a
//! variant here and a matching [`PortContract`] entry; nothing about the set
//! is configurable at runtime.

use crate::error::{ContractViolation, KernelError};
use crate::module::AdapterModule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A capability contract the application depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    VectorStore,
    GraphStore,
    DocumentStore,
    Embedder,
    Llm,
    Chunker,
    Retriever,
    Reranker,
    Router,
    Cache,
    Pipeline,
    Agent,
    Tool,
}

impl Port {
    /// Every port, in declaration order.
    pub const ALL: [Port; 13] = [
        Port::VectorStore,
        Port::GraphStore,
        Port::DocumentStore,
        Port::Embedder,
        Port::Llm,
        Port::Chunker,
        Port::Retriever,
        Port::Reranker,
        Port::Router,
        Port::Cache,
        Port::Pipeline,
        Port::Agent,
        Port::Tool,
    ];

    /// Manifest key for this port.
    pub fn as_str(&self) -> &'static str {
        match self {
            Port::VectorStore => "vector_store",
            Port::GraphStore => "graph_store",
            Port::DocumentStore => "document_store",
            Port::Embedder => "embedder",
            Port::Llm => "llm",
            Port::Chunker => "chunker",
            Port::Retriever => "retriever",
            Port::Reranker => "reranker",
            Port::Router => "router",
            Port::Cache => "cache",
            Port::Pipeline => "pipeline",
            Port::Agent => "agent",
            Port::Tool => "tool",
        }
    }

    /// The contract an adapter must satisfy to back this port.
    pub fn contract(&self) -> &'static PortContract {
        // CONTRACTS is laid out in the same order as `Port::ALL`.
        &CONTRACTS[*self as usize]
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Port {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Port::ALL
            .into_iter()
            .find(|port| port.as_str() == s)
            .ok_or_else(|| KernelError::UnknownPort(s.to_string()))
    }
}

/// Describes what an adapter must export to back a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortContract {
    /// The port this contract belongs to
    pub port: Port,
    /// Callbacks every conforming adapter must export
    pub callbacks: &'static [&'static str],
    /// One-line summary of the capability
    pub summary: &'static str,
}

impl PortContract {
    /// Check a module against this contract.
    ///
    /// A module conforms only if it declares the port and exports every
    /// required callback. Anything else is rejected.
    pub fn check(&self, module: &dyn AdapterModule) -> Result<(), ContractViolation> {
        if !module.implements().contains(&self.port) {
            return Err(ContractViolation::PortNotDeclared {
                reference: module.reference().to_string(),
                port: self.port,
            });
        }

        let missing: Vec<&'static str> = self
            .callbacks
            .iter()
            .copied()
            .filter(|callback| !module.exports(callback))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContractViolation::MissingCallbacks {
                reference: module.reference().to_string(),
                port: self.port,
                missing,
            })
        }
    }
}

static CONTRACTS: [PortContract; 13] = [
    PortContract {
        port: Port::VectorStore,
        callbacks: &["upsert", "search", "delete"],
        summary: "Stores embedding vectors and answers similarity queries",
    },
    PortContract {
        port: Port::GraphStore,
        callbacks: &["add_nodes", "add_edges", "query"],
        summary: "Stores entities and relations and answers graph queries",
    },
    PortContract {
        port: Port::DocumentStore,
        callbacks: &["put", "get", "delete"],
        summary: "Stores source documents by id",
    },
    PortContract {
        port: Port::Embedder,
        callbacks: &["embed", "dimensions"],
        summary: "Turns text into embedding vectors",
    },
    PortContract {
        port: Port::Llm,
        callbacks: &["complete", "stream"],
        summary: "Generates completions from a language model",
    },
    PortContract {
        port: Port::Chunker,
        callbacks: &["chunk"],
        summary: "Splits documents into retrievable chunks",
    },
    PortContract {
        port: Port::Retriever,
        callbacks: &["retrieve"],
        summary: "Fetches candidate chunks for a query",
    },
    PortContract {
        port: Port::Reranker,
        callbacks: &["rerank"],
        summary: "Reorders retrieved candidates by relevance",
    },
    PortContract {
        port: Port::Router,
        callbacks: &["route"],
        summary: "Chooses a pipeline or agent for a request",
    },
    PortContract {
        port: Port::Cache,
        callbacks: &["get", "put", "invalidate"],
        summary: "Caches intermediate and final results",
    },
    PortContract {
        port: Port::Pipeline,
        callbacks: &["run"],
        summary: "Executes a configured retrieval pipeline",
    },
    PortContract {
        port: Port::Agent,
        callbacks: &["handle"],
        summary: "Runs an agent loop over a request",
    },
    PortContract {
        port: Port::Tool,
        callbacks: &["describe", "invoke"],
        summary: "Exposes a callable tool to agents",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::StaticModule;

    #[test]
    fn test_port_names_round_trip_through_from_str() {
        for port in Port::ALL {
            assert_eq!(port.as_str().parse::<Port>().unwrap(), port);
        }
        assert!(matches!(
            "vectorstore".parse::<Port>(),
            Err(KernelError::UnknownPort(name)) if name == "vectorstore"
        ));
    }

    #[test]
    fn test_contract_table_matches_port_order() {
        for port in Port::ALL {
            assert_eq!(port.contract().port, port);
            assert!(!port.contract().callbacks.is_empty());
        }
    }

    #[test]
    fn test_contract_check_accepts_conforming_module() {
        let module = StaticModule::new("acme::Qdrant")
            .implementing(Port::VectorStore)
            .exporting(["upsert", "search", "delete", "count"]);

        assert!(Port::VectorStore.contract().check(&module).is_ok());
    }

    #[test]
    fn test_contract_check_rejects_undeclared_port() {
        let module = StaticModule::new("acme::OpenAi")
            .implementing(Port::Llm)
            .exporting(["complete", "stream", "upsert", "search", "delete"]);

        let err = Port::VectorStore.contract().check(&module).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::PortNotDeclared {
                reference: "acme::OpenAi".to_string(),
                port: Port::VectorStore,
            }
        );
    }

    #[test]
    fn test_contract_check_reports_missing_callbacks() {
        let module = StaticModule::new("acme::HalfStore")
            .implementing(Port::VectorStore)
            .exporting(["upsert"]);

        match Port::VectorStore.contract().check(&module) {
            Err(ContractViolation::MissingCallbacks { missing, .. }) => {
                assert_eq!(missing, vec!["search", "delete"]);
            }
            other => panic!("expected missing callbacks, got {other:?}"),
        }
    }
}
