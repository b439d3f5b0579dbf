//! Background sync and the cache janitor.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::cache::Cache;
use crate::error::{Result, WorkerError};

/// Work performed when the platform fires a background sync.
#[async_trait]
pub trait SyncHandler: Send + Sync + 'static {
    async fn sync(&self) -> Result<()>;
}

/// Default handler. There is no outbound queue to flush yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSync;

#[async_trait]
impl SyncHandler for NoopSync {
    async fn sync(&self) -> Result<()> {
        debug!("Background sync: no queued outbound messages");
        Ok(())
    }
}

/// Runs a background sync. Errors are logged and never propagated, so the
/// platform's own retry scheduling stays in charge.
pub async fn run_background_sync(handler: &dyn SyncHandler) {
    info!("Background sync triggered");
    if let Err(e) = handler.sync().await {
        error!("Background sync failed: {}", e);
    }
}

/// Deletes entries whose capture time is older than `max_age` at `now`.
///
/// Entries without a readable capture time are left alone.
/// Returns the number of entries removed.
pub async fn run_janitor(cache: &Cache, max_age: Duration, now: DateTime<Utc>) -> Result<usize> {
    let max_age = chrono::Duration::from_std(max_age)
        .map_err(|e| WorkerError::Sync(format!("max age out of range: {}", e)))?;
    let cutoff = now
        .checked_sub_signed(max_age)
        .ok_or_else(|| WorkerError::Sync(format!("max age {} reaches before {}", max_age, now)))?;

    let removed = cache.remove_captured_before(cutoff).await;
    if removed > 0 {
        info!("Cache janitor: removed {} entries from {}", removed, cache.name());
    } else {
        debug!("Cache janitor: nothing older than {} in {}", cutoff, cache.name());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchRequest, FetchResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn request(path: &str) -> FetchRequest {
        FetchRequest::get(Url::parse("http://localhost:3000").unwrap().join(path).unwrap())
    }

    struct FailingSync(AtomicUsize);

    #[async_trait]
    impl SyncHandler for FailingSync {
        async fn sync(&self) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(WorkerError::Sync("outbox unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_noop_sync_succeeds() {
        tokio_test::assert_ok!(NoopSync.sync().await);
    }

    #[tokio::test]
    async fn test_background_sync_swallows_errors() {
        let handler = FailingSync(AtomicUsize::new(0));
        run_background_sync(&handler).await;
        assert_eq!(handler.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_janitor_removes_only_old_entries() {
        let cache = Cache::new("test-v1", 10);
        let now = Utc::now();
        cache
            .put(
                &request("/ten-days.js"),
                FetchResponse::ok("old").with_date(now - chrono::Duration::days(10)),
            )
            .await
            .unwrap();
        cache
            .put(
                &request("/one-day.js"),
                FetchResponse::ok("new").with_date(now - chrono::Duration::days(1)),
            )
            .await
            .unwrap();

        let removed = run_janitor(&cache, WEEK, now).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.match_request(&request("/one-day.js")).await.is_some());
    }

    #[tokio::test]
    async fn test_janitor_rejects_max_age_beyond_calendar() {
        let cache = Cache::new("test-v1", 10);
        cache
            .put(
                &request("/ancient.js"),
                FetchResponse::ok("x").with_date(Utc::now() - chrono::Duration::days(10)),
            )
            .await
            .unwrap();

        let result = run_janitor(&cache, Duration::from_secs(1_000_000_000_000_000), Utc::now()).await;
        assert!(matches!(result, Err(WorkerError::Sync(_))));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_janitor_keeps_undated_entries() {
        let cache = Cache::new("test-v1", 10);
        cache.put(&request("/undated.js"), FetchResponse::ok("x")).await.unwrap();

        let removed = run_janitor(&cache, WEEK, Utc::now()).await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(cache.len().await, 1);
    }
}
