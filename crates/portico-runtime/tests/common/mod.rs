//! Common test utilities shared across `portico-runtime` integration tests.
//!
//! Declared with `mod common;` inside each integration test file that needs it.

use portico_kernel::{ModuleCatalog, Port, StaticModule};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Reference of the conforming vector store used across tests.
pub const VECTOR_STORE: &str = "acme::PgVector";
/// Reference of a second conforming vector store.
pub const ALT_VECTOR_STORE: &str = "acme::Qdrant";
/// Reference of a conforming LLM.
pub const LLM: &str = "acme::OpenAi";
/// Reference of a module that claims the vector store port but lacks `search`.
pub const BROKEN_VECTOR_STORE: &str = "acme::WriteOnlyStore";

/// Catalog with the test modules registered.
pub fn catalog() -> Arc<ModuleCatalog> {
    Arc::new(
        ModuleCatalog::new()
            .with(StaticModule::new(VECTOR_STORE).conforming_to(Port::VectorStore))
            .with(StaticModule::new(ALT_VECTOR_STORE).conforming_to(Port::VectorStore))
            .with(StaticModule::new(LLM).conforming_to(Port::Llm))
            .with(
                StaticModule::new(BROKEN_VECTOR_STORE)
                    .implementing(Port::VectorStore)
                    .exporting(["upsert", "delete"]),
            ),
    )
}

/// Temporary directory holding manifest files.
pub struct ManifestDir {
    dir: TempDir,
}

impl ManifestDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write (or overwrite) a manifest file and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

/// A YAML manifest binding the vector store (and optionally an LLM).
pub fn vector_store_manifest(version: &str, adapter: &str, dimensions: u32) -> String {
    format!(
        r#"
version: "{version}"
environment: test
adapters:
  vector_store:
    adapter: {adapter}
    config:
      dimensions: {dimensions}
"#
    )
}

/// Same as [`vector_store_manifest`] with an LLM binding added.
pub fn vector_store_and_llm_manifest(version: &str, dimensions: u32) -> String {
    format!(
        r#"{}  llm:
    adapter: {LLM}
    config:
      model: gpt-4o
"#,
        vector_store_manifest(version, VECTOR_STORE, dimensions)
    )
}
