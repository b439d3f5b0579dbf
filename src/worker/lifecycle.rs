//! Install/Activate Lifecycle
//!
//! `Installing → Waiting → Activating → Active`. Install precaches the
//! manifest into the current version's store; activate deletes every other
//! store and then claims open clients.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::Ordering;

use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{Cache, RequestKey};
use crate::config::PrecacheMode;
use crate::error::{Result, WorkerError};
use crate::models::{FetchRequest, FetchResponse};
use crate::worker::OfflineCacheWorker;

// == Worker State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Precaching; a failed install stays here until retried
    Installing,
    /// Installed, an older version may still control pages
    Waiting,
    Activating,
    /// Controlling pages and routing fetches
    Active,
    /// Replaced by a newer version
    Redundant,
}

impl WorkerState {
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

impl OfflineCacheWorker {
    // == Install ==
    /// Precaches the manifest and moves to `Waiting`.
    ///
    /// When skip-waiting is configured or was requested during install, the
    /// worker activates immediately afterwards. On failure the state stays
    /// `Installing` so the install can be retried.
    pub async fn install(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;

        let state = self.state().await;
        if state != WorkerState::Installing {
            return Err(WorkerError::InvalidState {
                expected: "installing",
                actual: state,
            });
        }

        info!(
            "Installing {}: precaching {} URLs",
            self.cache_name,
            self.config.precache_urls.len()
        );

        let entries = match self.fetch_manifest().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Install failed, will retry on next load: {}", e);
                return Err(e);
            }
        };

        let cache = self.current_cache().await;
        if let Err(e) = store_manifest(&cache, entries).await {
            warn!("Install failed, discarding {}: {}", self.cache_name, e);
            self.storage.delete(&self.cache_name).await;
            return Err(e);
        }

        *self.state.write().await = WorkerState::Waiting;
        info!("Installed {} ({} entries)", self.cache_name, cache.len().await);

        if self.config.skip_waiting_on_install || self.skip_waiting_requested.load(Ordering::SeqCst)
        {
            self.activate_locked().await?;
        }

        Ok(())
    }

    /// Fetches every manifest URL concurrently.
    ///
    /// In atomic mode any failure fails the whole batch before anything is
    /// stored; in best-effort mode failing entries are dropped.
    async fn fetch_manifest(&self) -> Result<Vec<(FetchRequest, FetchResponse)>> {
        let mut requests = Vec::with_capacity(self.config.precache_urls.len());
        for entry in &self.config.precache_urls {
            let url = resolve(&self.config.origin, entry)?;
            requests.push(FetchRequest::get(url));
        }

        let results = join_all(requests.iter().map(|r| self.network.fetch(r))).await;

        let mut entries = Vec::with_capacity(requests.len());
        for (request, result) in requests.into_iter().zip(results) {
            let outcome = match result {
                Ok(response) if response.is_ok() => Ok(response),
                Ok(response) => Err(format!("status {}", response.status)),
                Err(e) => Err(e.to_string()),
            };

            match (outcome, self.config.precache_mode) {
                (Ok(response), _) => entries.push((request, response)),
                (Err(reason), PrecacheMode::Atomic) => {
                    return Err(WorkerError::Precache {
                        url: request.url.to_string(),
                        reason,
                    });
                }
                (Err(reason), PrecacheMode::BestEffort) => {
                    warn!("Skipping precache of {}: {}", request.url, reason);
                }
            }
        }

        Ok(entries)
    }

    // == Skip Waiting ==
    /// Forces activation without waiting for old pages to close.
    ///
    /// While installing the request is remembered and applied when install
    /// completes. Once active it is a no-op.
    pub async fn skip_waiting(&self) -> Result<()> {
        self.skip_waiting_requested.store(true, Ordering::SeqCst);

        match self.state().await {
            WorkerState::Waiting => {
                let _guard = self.lifecycle.lock().await;
                if self.state().await == WorkerState::Waiting {
                    self.activate_locked().await?;
                }
                Ok(())
            }
            state => {
                debug!("Skip waiting while {}: nothing to do now", state);
                Ok(())
            }
        }
    }

    // == Activate ==
    /// Deletes stale stores, claims clients, and starts routing fetches.
    pub async fn activate(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;
        self.activate_locked().await
    }

    /// Caller must hold the lifecycle lock.
    async fn activate_locked(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Waiting {
                return Err(WorkerError::InvalidState {
                    expected: "waiting",
                    actual: *state,
                });
            }
            *state = WorkerState::Activating;
        }
        info!("Activating {}", self.cache_name);

        for name in self.storage.keys().await {
            if name != self.cache_name {
                info!("Deleting stale cache {}", name);
                self.storage.delete(&name).await;
            }
        }

        match self.clients.claim().await {
            Ok(claimed) => info!("Claimed {} clients", claimed),
            Err(e) => warn!("Failed to claim clients: {}", e),
        }

        *self.state.write().await = WorkerState::Active;
        info!("Activated {}", self.cache_name);
        Ok(())
    }
}

/// Writes fetched manifest entries into `cache`.
///
/// Fails before writing anything when the distinct entries exceed the
/// store's quota.
async fn store_manifest(cache: &Cache, entries: Vec<(FetchRequest, FetchResponse)>) -> Result<()> {
    let distinct: HashSet<RequestKey> = entries
        .iter()
        .map(|(request, _)| RequestKey::get(&request.url))
        .collect();
    if distinct.len() > cache.max_entries() {
        return Err(WorkerError::CacheFull(format!(
            "{} precache entries exceed the quota of {}",
            distinct.len(),
            cache.max_entries()
        )));
    }

    for (request, response) in entries {
        cache.put(&request, response).await?;
    }
    Ok(())
}

/// Resolves a manifest entry against the worker's origin.
pub(crate) fn resolve(origin: &Url, entry: &str) -> Result<Url> {
    origin
        .join(entry)
        .map_err(|e| WorkerError::InvalidRequest(format!("bad URL {}: {}", entry, e)))
}
