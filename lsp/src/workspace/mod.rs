//! Rebuild coordination: change signals are applied in order on one task,
//! rebuilds run on the blocking pool and only the newest one publishes.

mod signal;

#[cfg(test)]
mod tests;

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use meson_core::{
    diagnostic::Diagnostic,
    typ::TypeNamespace,
    util::{FastHashSet, fast_hash_set_new},
};
use tokio::sync::{Mutex as AsyncMutex, RwLock, Semaphore, mpsc, watch};
use tracing::{debug, error, info, warn};

pub use signal::Signal;

use crate::project::{AstCache, FileSource, MesonTree};

/// Receives the diagnostics of committed rebuilds.
#[tower_lsp::async_trait]
pub trait DiagnosticsSink: Send + Sync {
    /// Replace what is shown for `file`; an empty slice clears it.
    async fn publish(&self, file: &Path, diagnostics: &[Diagnostic]);

    /// A rebuild for `generation` finished `phase` and is about to check
    /// whether it is still current.
    async fn phase_finished(&self, _generation: u64, _phase: RebuildPhase) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildPhase {
    Parse,
    Analysis,
}

impl RebuildPhase {
    pub fn name(self) -> &'static str {
        match self {
            RebuildPhase::Parse => "parse",
            RebuildPhase::Analysis => "analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceOptions {
    /// Delay before a rebuild starts; signals arriving meanwhile supersede it.
    pub debounce: Duration,
    /// Rebuilds allowed to parse and analyze at the same time.
    pub max_concurrent: usize,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            max_concurrent: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Committed(u64),
    /// A newer signal arrived; nothing was published.
    Superseded,
    /// The root build file could not be read.
    Failed,
}

/// One Meson project as the editor sees it.
pub struct Workspace {
    root_dir: PathBuf,
    source: FileSource,
    cache: AstCache,
    ns: Arc<TypeNamespace>,
    generation: AtomicU64,
    debounce_ms: AtomicU64,
    limiter: Mutex<Arc<Semaphore>>,
    tree: RwLock<Option<Arc<MesonTree>>>,
    /// Files with published diagnostics. Held for the whole publish step.
    published: AsyncMutex<FastHashSet<PathBuf>>,
    committed: watch::Sender<u64>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Workspace {
    pub fn new(
        root_dir: PathBuf,
        ns: Arc<TypeNamespace>,
        sink: Arc<dyn DiagnosticsSink>,
        options: WorkspaceOptions,
    ) -> Arc<Workspace> {
        let (committed, _) = watch::channel(0);
        Arc::new(Workspace {
            root_dir: crate::project::normalize(&root_dir),
            source: FileSource::new(),
            cache: AstCache::new(),
            ns,
            generation: AtomicU64::new(0),
            debounce_ms: AtomicU64::new(options.debounce.as_millis() as u64),
            limiter: Mutex::new(Arc::new(Semaphore::new(options.max_concurrent.max(1)))),
            tree: RwLock::new(None),
            published: AsyncMutex::new(fast_hash_set_new()),
            committed,
            sink,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn cache(&self) -> &AstCache {
        &self.cache
    }

    pub fn namespace(&self) -> &Arc<TypeNamespace> {
        &self.ns
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Generation of the last committed rebuild, updated on every commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.committed.subscribe()
    }

    /// Last committed tree. Never waits for a rebuild in flight.
    pub async fn snapshot(&self) -> Option<Arc<MesonTree>> {
        self.tree.read().await.clone()
    }

    pub fn configure(&self, options: WorkspaceOptions) {
        self.debounce_ms
            .store(options.debounce.as_millis() as u64, Ordering::SeqCst);
        let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
        match self.limiter.lock() {
            Ok(mut limiter) => *limiter = semaphore,
            Err(poisoned) => *poisoned.into_inner() = semaphore,
        }
    }

    /// Apply `signal` to the file state and return the new generation.
    pub fn apply(&self, signal: Signal) -> u64 {
        debug!(signal = signal.name(), "applying signal");
        match signal {
            Signal::Open { path, text } => self.source.open(path, text),
            Signal::Change { path, text } => self.source.set_override(path, text),
            // the disk now holds what the buffer held
            Signal::Save { path } => self.source.remove_override(&path),
            Signal::Close { path } => self.source.close(&path),
            Signal::CreateFiles(_) | Signal::Reload => {}
            Signal::DeleteFiles(paths) => {
                for path in paths {
                    self.source.evict(&path);
                    self.cache.evict(&path);
                }
            }
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn superseded(&self, generation: u64, phase: &str) -> RebuildOutcome {
        debug!(generation, current = self.generation(), phase, "rebuild superseded");
        RebuildOutcome::Superseded
    }

    fn limiter(&self) -> Arc<Semaphore> {
        match self.limiter.lock() {
            Ok(limiter) => limiter.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rebuild the whole project for `generation`, giving up as soon as a
    /// newer signal has been applied.
    pub async fn rebuild(self: Arc<Self>, generation: u64) -> RebuildOutcome {
        let debounce = self.debounce_ms.load(Ordering::SeqCst);
        if debounce > 0 {
            tokio::time::sleep(Duration::from_millis(debounce)).await;
        }
        if !self.is_current(generation) {
            return self.superseded(generation, "debounce");
        }
        let Ok(_permit) = self.limiter().acquire_owned().await else {
            return self.superseded(generation, "queue");
        };
        if !self.is_current(generation) {
            return self.superseded(generation, "queue");
        }
        debug!(generation, root = %self.root_dir.display(), "rebuild started");

        let ws = self.clone();
        let parsed = tokio::task::spawn_blocking(move || MesonTree::parse_all(&ws.root_dir, &ws.source, &ws.cache)).await;
        self.sink.phase_finished(generation, RebuildPhase::Parse).await;
        let mut tree = match parsed {
            Ok(Ok(tree)) => tree,
            Ok(Err(err)) => {
                if !self.is_current(generation) {
                    return self.superseded(generation, RebuildPhase::Parse.name());
                }
                warn!("{:#}", err);
                return self.clear(generation).await;
            }
            Err(err) => {
                error!("parse task failed: {}", err);
                return RebuildOutcome::Failed;
            }
        };
        if !self.is_current(generation) {
            return self.superseded(generation, RebuildPhase::Parse.name());
        }

        let ns = self.ns.clone();
        let analyzed = tokio::task::spawn_blocking(move || {
            tree.analyze_all(&ns);
            tree
        })
        .await;
        self.sink.phase_finished(generation, RebuildPhase::Analysis).await;
        let tree = match analyzed {
            Ok(tree) => tree,
            Err(err) => {
                error!("analysis task failed: {}", err);
                return RebuildOutcome::Failed;
            }
        };
        if !self.is_current(generation) {
            return self.superseded(generation, RebuildPhase::Analysis.name());
        }

        self.publish(generation, tree).await
    }

    async fn publish(&self, generation: u64, tree: MesonTree) -> RebuildOutcome {
        let mut published = self.published.lock().await;
        if !self.is_current(generation) {
            return self.superseded(generation, "publish");
        }
        let diagnostics = tree.diagnostics();
        *self.tree.write().await = Some(Arc::new(tree));

        let mut files = fast_hash_set_new();
        for (file, file_diagnostics) in &diagnostics {
            self.sink.publish(file, file_diagnostics).await;
            files.insert(file.clone());
        }
        for stale in published.iter().filter(|f| !files.contains(*f)) {
            self.sink.publish(stale, &[]).await;
        }
        *published = files;
        self.committed.send_replace(generation);
        info!(generation, files = diagnostics.len(), "rebuild committed");
        RebuildOutcome::Committed(generation)
    }

    /// Drop the tree and every published diagnostic, unless a newer signal
    /// arrived while waiting for the publish lock.
    async fn clear(&self, generation: u64) -> RebuildOutcome {
        let mut published = self.published.lock().await;
        if !self.is_current(generation) {
            return self.superseded(generation, "clear");
        }
        *self.tree.write().await = None;
        for file in published.iter() {
            self.sink.publish(file, &[]).await;
        }
        published.clear();
        RebuildOutcome::Failed
    }
}

/// Sends signals to the single task that applies them in arrival order.
#[derive(Clone)]
pub struct WorkspaceHandle {
    tx: mpsc::UnboundedSender<Signal>,
    workspace: Arc<Workspace>,
}

impl WorkspaceHandle {
    /// Start the signal task. Must be called inside a tokio runtime.
    pub fn spawn(workspace: Arc<Workspace>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Signal>();
        let ws = workspace.clone();
        tokio::spawn(async move {
            while let Some(signal) = rx.recv().await {
                let generation = ws.apply(signal);
                tokio::spawn(ws.clone().rebuild(generation));
            }
            debug!("workspace signal task stopped");
        });
        Self { tx, workspace }
    }

    pub fn send(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            warn!("workspace task is gone, signal dropped");
        }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }
}
