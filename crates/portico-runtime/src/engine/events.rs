//! Reload events and manifest diffs

use crate::error::ManifestError;
use portico_kernel::{Manifest, Port};
use std::path::PathBuf;
use std::sync::Arc;

/// Port-level difference between two manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    /// Ports declared only in the new manifest
    pub added: Vec<Port>,
    /// Ports declared only in the old manifest
    pub removed: Vec<Port>,
    /// Ports declared in both whose declaration changed
    pub changed: Vec<Port>,
    /// Previous version string, when there was a previous manifest
    pub previous_version: Option<String>,
}

impl ManifestDiff {
    /// Diff `next` against `previous` (`None` on first load).
    pub fn between(previous: Option<&Manifest>, next: &Manifest) -> Self {
        let Some(previous) = previous else {
            return Self {
                added: next.adapters.keys().copied().collect(),
                ..Self::default()
            };
        };

        let mut diff = Self {
            previous_version: Some(previous.version.clone()),
            ..Self::default()
        };
        for (port, declaration) in &next.adapters {
            match previous.adapters.get(port) {
                None => diff.added.push(*port),
                Some(old) if old != declaration => diff.changed.push(*port),
                Some(_) => {}
            }
        }
        diff.removed = previous
            .adapters
            .keys()
            .filter(|port| !next.adapters.contains_key(port))
            .copied()
            .collect();
        diff
    }

    /// True when no port declaration changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Broadcast by the engine after each load or reload attempt.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReloadEvent {
    /// A manifest was loaded and its bindings published.
    Loaded {
        engine: String,
        path: PathBuf,
        manifest: Arc<Manifest>,
        diff: ManifestDiff,
    },
    /// A load or reload failed; the previous state is still current.
    Rejected {
        engine: String,
        path: PathBuf,
        error: ManifestError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_kernel::validate_value;
    use serde_json::json;

    fn manifest(version: &str, adapters: serde_json::Value) -> Manifest {
        validate_value(json!({
            "version": version,
            "environment": "test",
            "adapters": adapters
        }))
        .unwrap()
    }

    #[test]
    fn test_first_load_adds_everything() {
        let next = manifest("1.0", json!({ "llm": { "adapter": "a" }, "tool": { "adapter": "b" } }));
        let diff = ManifestDiff::between(None, &next);

        assert_eq!(diff.added, vec![Port::Llm, Port::Tool]);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.previous_version, None);
    }

    #[test]
    fn test_diff_added_removed_changed() {
        let old = manifest(
            "1.0",
            json!({
                "vector_store": { "adapter": "a", "config": { "dimensions": 1536 } },
                "llm": { "adapter": "b" },
                "cache": { "adapter": "c" }
            }),
        );
        let new = manifest(
            "2.0",
            json!({
                "vector_store": { "adapter": "a", "config": { "dimensions": 3072 } },
                "llm": { "adapter": "b" },
                "router": { "adapter": "d" }
            }),
        );

        let diff = ManifestDiff::between(Some(&old), &new);
        assert_eq!(diff.added, vec![Port::Router]);
        assert_eq!(diff.removed, vec![Port::Cache]);
        assert_eq!(diff.changed, vec![Port::VectorStore]);
        assert_eq!(diff.previous_version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_identical_manifests_have_empty_diff() {
        let m = manifest("1.0", json!({ "llm": { "adapter": "b" } }));
        assert!(ManifestDiff::between(Some(&m), &m).is_empty());
    }
}
