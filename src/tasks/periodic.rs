//! Periodic Sync Timer
//!
//! When the worker is hosted as a server there is no platform scheduler, so
//! this task fires the periodic sync event at a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::worker::{OfflineCacheWorker, WorkerEvent};

/// Spawns a background task that dispatches a periodic sync event every
/// `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_periodic_sync_task(worker.clone(), 3600);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_periodic_sync_task(
    worker: Arc<OfflineCacheWorker>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting periodic sync task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let tag = worker.config().periodic_sync_tag.clone();
            if let Err(e) = worker.dispatch(WorkerEvent::PeriodicSync { tag }).await {
                error!("Periodic sync dispatch failed: {}", e);
            }
        }
    })
}
