//! Manifest engine
//!
//! [`ManifestEngine`] is a handle to a single actor task that owns the
//! current manifest and the path it came from. Every load, reload and
//! manifest read goes through the actor's mailbox, so two reloads against
//! the same engine never interleave.
//!
//! Bindings are published to the engine's [`PortRegistry`], which
//! application code reads directly without going through the actor.
//!
//! # Example
//!
//! ```rust,no_run
//! use portico_kernel::{ModuleCatalog, Port, StaticModule};
//! use portico_runtime::{EngineOptions, ManifestEngine};
//!
//! # async fn demo() -> Result<(), portico_runtime::EngineError> {
//! let catalog = ModuleCatalog::new()
//!     .with(StaticModule::new("acme::PgVector").conforming_to(Port::VectorStore));
//!
//! let engine = ManifestEngine::start(
//!     EngineOptions::new("primary", catalog).with_manifest_path("portico.yaml"),
//! )
//! .await?;
//!
//! let store = engine.get_adapter(Port::VectorStore);
//! engine.reload().await?;
//! # Ok(())
//! # }
//! ```

pub mod events;

pub use events::{ManifestDiff, ReloadEvent};

use crate::error::{EngineError, EngineResult, ManifestResult};
use crate::loader::ManifestLoader;
use crate::resolver::AdapterResolver;
use portico_kernel::{Manifest, ModuleCatalog, Port, PortRegistry, ResolvedBinding};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

const DEFAULT_MAILBOX_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 16;

/// Options for [`ManifestEngine::start`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    name: String,
    manifest_path: Option<PathBuf>,
    catalog: Arc<ModuleCatalog>,
    registry: Option<Arc<PortRegistry>>,
    mailbox_capacity: usize,
}

impl EngineOptions {
    /// Options for an engine named `name` resolving against `catalog`.
    pub fn new(name: impl Into<String>, catalog: impl Into<Arc<ModuleCatalog>>) -> Self {
        Self {
            name: name.into(),
            manifest_path: None,
            catalog: catalog.into(),
            registry: None,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }

    /// Load this manifest before the engine starts.
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    /// Publish into an existing registry instead of a fresh one.
    ///
    /// Engines sharing a registry overwrite each other's bindings.
    pub fn with_registry(mut self, registry: Arc<PortRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }
}

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No manifest has been loaded yet
    Unloaded,
    /// A validated manifest is current
    Loaded,
}

/// Point-in-time view of an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    pub name: String,
    pub state: EngineState,
    pub manifest_path: Option<PathBuf>,
    pub version: Option<String>,
    pub bound_ports: BTreeSet<Port>,
}

/// State owned by the actor. Replaced as a whole on every successful load.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    manifest: Option<Arc<Manifest>>,
    manifest_path: Option<PathBuf>,
}

enum Command {
    GetManifest {
        reply: oneshot::Sender<Option<Arc<Manifest>>>,
    },
    Load {
        path: PathBuf,
        reply: oneshot::Sender<EngineResult<Arc<Manifest>>>,
    },
    Reload {
        reply: oneshot::Sender<EngineResult<Arc<Manifest>>>,
    },
    Status {
        reply: oneshot::Sender<EngineStatus>,
    },
}

/// Handle to a running manifest engine. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ManifestEngine {
    name: Arc<str>,
    mailbox: mpsc::Sender<Command>,
    registry: Arc<PortRegistry>,
    events: broadcast::Sender<ReloadEvent>,
}

impl ManifestEngine {
    /// Start an engine.
    ///
    /// When the options carry a manifest path, the full load pipeline runs
    /// before this returns, and any failure aborts startup with
    /// [`EngineError::Manifest`]. Without a path the engine starts unloaded.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(options: EngineOptions) -> EngineResult<Self> {
        let EngineOptions {
            name,
            manifest_path,
            catalog,
            registry,
            mailbox_capacity,
        } = options;

        let registry = registry.unwrap_or_default();
        let (mailbox, inbox) = mpsc::channel(mailbox_capacity);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut actor = EngineActor {
            name: name.clone(),
            snapshot: Snapshot::default(),
            resolver: AdapterResolver::new(catalog),
            registry: Arc::clone(&registry),
            events: events.clone(),
            inbox,
        };

        if let Some(path) = manifest_path {
            let (manifest, bindings) = actor.prepare(&path).await.inspect_err(|err| {
                error!(engine = %name, path = %path.display(), error = %err, "Manifest engine failed to start");
            })?;
            actor.commit(path, manifest, bindings);
        }

        tokio::spawn(actor.run());
        info!(engine = %name, "Manifest engine started");

        Ok(Self {
            name: name.into(),
            mailbox,
            registry,
            events,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current manifest, or `None` while unloaded.
    pub async fn get_manifest(&self) -> Option<Arc<Manifest>> {
        self.request(|reply| Command::GetManifest { reply })
            .await
            .unwrap_or_else(|err| {
                error!(engine = %self.name, error = %err, "Manifest request failed");
                None
            })
    }

    /// Binding for a port from this engine's registry.
    pub fn get_adapter(&self, port: Port) -> Option<ResolvedBinding> {
        self.registry.get(port)
    }

    /// Load a manifest from `path` and make it current.
    ///
    /// On success the path becomes the one used by [`reload`](Self::reload).
    /// On failure nothing changes.
    pub async fn load(&self, path: impl Into<PathBuf>) -> EngineResult<Arc<Manifest>> {
        let path = path.into();
        self.request(|reply| Command::Load { path, reply }).await?
    }

    /// Re-run the load pipeline against the recorded path.
    ///
    /// Fails with [`EngineError::NoManifestPath`] if no path was ever
    /// established.
    pub async fn reload(&self) -> EngineResult<Arc<Manifest>> {
        self.request(|reply| Command::Reload { reply }).await?
    }

    pub async fn status(&self) -> EngineResult<EngineStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Receive a [`ReloadEvent`] for every subsequent load attempt.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.events.subscribe()
    }

    /// The registry this engine publishes into.
    pub fn registry(&self) -> &Arc<PortRegistry> {
        &self.registry
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> EngineResult<T> {
        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(command(reply))
            .await
            .map_err(|_| EngineError::Stopped(self.name.to_string()))?;
        response
            .await
            .map_err(|_| EngineError::Stopped(self.name.to_string()))
    }
}

struct EngineActor {
    name: String,
    snapshot: Snapshot,
    resolver: AdapterResolver,
    registry: Arc<PortRegistry>,
    events: broadcast::Sender<ReloadEvent>,
    inbox: mpsc::Receiver<Command>,
}

impl EngineActor {
    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            self.handle(command).await;
        }
        debug!(engine = %self.name, "All engine handles dropped, stopping");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::GetManifest { reply } => {
                let _ = reply.send(self.snapshot.manifest.clone());
            }
            Command::Load { path, reply } => {
                let result = self.load(path).await;
                let _ = reply.send(result);
            }
            Command::Reload { reply } => {
                let result = match self.snapshot.manifest_path.clone() {
                    Some(path) => self.load(path).await,
                    None => Err(EngineError::NoManifestPath),
                };
                let _ = reply.send(result);
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    async fn load(&mut self, path: PathBuf) -> EngineResult<Arc<Manifest>> {
        match self.prepare(&path).await {
            Ok((manifest, bindings)) => Ok(self.commit(path, manifest, bindings)),
            Err(err) => {
                warn!(
                    engine = %self.name,
                    path = %path.display(),
                    error = %err,
                    "Manifest rejected, keeping previous state"
                );
                let _ = self.events.send(ReloadEvent::Rejected {
                    engine: self.name.clone(),
                    path,
                    error: err.clone(),
                });
                Err(err.into())
            }
        }
    }

    /// Read, validate and resolve without touching any state.
    async fn prepare(&self, path: &Path) -> ManifestResult<(Manifest, Vec<(Port, ResolvedBinding)>)> {
        let manifest = ManifestLoader::from_path(path).await?;
        let bindings = self.resolver.resolve_all(&manifest)?;
        Ok((manifest, bindings))
    }

    /// Publish fully resolved bindings and swap in the new snapshot.
    fn commit(
        &mut self,
        path: PathBuf,
        manifest: Manifest,
        bindings: Vec<(Port, ResolvedBinding)>,
    ) -> Arc<Manifest> {
        let diff = ManifestDiff::between(self.snapshot.manifest.as_deref(), &manifest);
        let bound = bindings.len();
        self.registry.publish(bindings);

        let manifest = Arc::new(manifest);
        self.snapshot = Snapshot {
            manifest: Some(Arc::clone(&manifest)),
            manifest_path: Some(path.clone()),
        };

        info!(
            engine = %self.name,
            path = %path.display(),
            version = %manifest.version,
            environment = %manifest.environment,
            bound,
            added = ?diff.added,
            removed = ?diff.removed,
            changed = ?diff.changed,
            "Manifest loaded"
        );
        let _ = self.events.send(ReloadEvent::Loaded {
            engine: self.name.clone(),
            path,
            manifest: Arc::clone(&manifest),
            diff,
        });

        manifest
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            name: self.name.clone(),
            state: if self.snapshot.manifest.is_some() {
                EngineState::Loaded
            } else {
                EngineState::Unloaded
            },
            manifest_path: self.snapshot.manifest_path.clone(),
            version: self
                .snapshot
                .manifest
                .as_ref()
                .map(|manifest| manifest.version.clone()),
            bound_ports: self.registry.list_ports(),
        }
    }
}
