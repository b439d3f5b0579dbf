//! Worker Module
//!
//! The offline cache worker: one process-scoped struct owning the cache
//! storage, the host collaborators and the lifecycle state. Every platform
//! event enters through [`OfflineCacheWorker::dispatch`].
//!
//! # Components
//! - Lifecycle: install (precache), skip-waiting, activate (stale cleanup, claim)
//! - Router: network-first for documents, cache-first for static assets
//! - Events: the event kind → handler dispatch table

mod events;
mod lifecycle;
mod router;

#[cfg(test)]
mod property_tests;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::cache::{Cache, CacheStats, CacheStorage};
use crate::config::Config;
use crate::host::{Clients, Network, Notifier};
use crate::models::VersionReply;
use crate::tasks::{NoopSync, SyncHandler};

pub use events::{EventKind, EventOutcome, WorkerEvent};
pub use lifecycle::WorkerState;
pub use router::Route;

// == Offline Cache Worker ==
/// Worker state shared by every event handler.
pub struct OfflineCacheWorker {
    config: Config,
    cache_name: String,
    storage: Arc<CacheStorage>,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    notifier: Arc<dyn Notifier>,
    sync_handler: Arc<dyn SyncHandler>,
    state: RwLock<WorkerState>,
    /// Serializes install and activate
    lifecycle: Mutex<()>,
    skip_waiting_requested: AtomicBool,
    stats: RwLock<CacheStats>,
}

impl OfflineCacheWorker {
    // == Constructor ==
    /// Creates a worker in the `Installing` state with empty cache storage.
    pub fn new(
        config: Config,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let storage = Arc::new(CacheStorage::new(config.max_cache_entries));
        Self {
            cache_name: config.cache_name(),
            config,
            storage,
            network,
            clients,
            notifier,
            sync_handler: Arc::new(NoopSync),
            state: RwLock::new(WorkerState::Installing),
            lifecycle: Mutex::new(()),
            skip_waiting_requested: AtomicBool::new(false),
            stats: RwLock::new(CacheStats::new()),
        }
    }

    /// Uses existing cache storage, e.g. stores left by a previous version.
    pub fn with_storage(mut self, storage: Arc<CacheStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the routine run on background sync.
    pub fn with_sync_handler(mut self, handler: Arc<dyn SyncHandler>) -> Self {
        self.sync_handler = handler;
        self
    }

    // == Accessors ==
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the store owned by this version.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Opens (or recreates) the current version's store.
    pub async fn current_cache(&self) -> Arc<Cache> {
        self.storage.open(&self.cache_name).await
    }

    pub fn version_reply(&self) -> VersionReply {
        VersionReply {
            version: self.config.cache_version.clone(),
            cache: self.cache_name.clone(),
        }
    }
}

impl std::fmt::Debug for OfflineCacheWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineCacheWorker")
            .field("cache_name", &self.cache_name)
            .field("origin", &self.config.origin.as_str())
            .finish_non_exhaustive()
    }
}
