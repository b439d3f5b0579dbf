//! Cache Store Module
//!
//! A single named store mapping GET requests to responses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use url::Url;

use crate::cache::{CacheEntry, RequestKey};
use crate::error::{Result, WorkerError};
use crate::models::{FetchRequest, FetchResponse};

// == Cache ==
/// One named cache store. Writes are last-writer-wins per key.
#[derive(Debug)]
pub struct Cache {
    name: String,
    entries: RwLock<HashMap<RequestKey, CacheEntry>>,
    /// Entry quota; a put of a new key beyond it fails
    max_entries: usize,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `name` - Versioned store name, e.g. `quantum-chat-v2.1`
    /// * `max_entries` - Entry quota for the store
    pub fn new(name: impl Into<String>, max_entries: usize) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    // == Name ==
    /// Returns the store's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Max Entries ==
    /// Returns the entry quota.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Match ==
    /// Looks up the stored response for a request. Non-GET requests never match.
    pub async fn match_request(&self, request: &FetchRequest) -> Option<FetchResponse> {
        let key = RequestKey::from_request(request).ok()?;
        self.match_key(&key).await
    }

    /// Looks up the stored response for a GET of `url`.
    pub async fn match_url(&self, url: &Url) -> Option<FetchResponse> {
        self.match_key(&RequestKey::get(url)).await
    }

    /// Looks up the stored response for a key.
    ///
    /// # Arguments
    /// * `key` - Method and fragment-less URL of the request
    pub async fn match_key(&self, key: &RequestKey) -> Option<FetchResponse> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.response.clone())
    }

    // == Put ==
    /// Stores a response under the request's key, replacing any previous entry.
    ///
    /// # Arguments
    /// * `request` - A GET request; other methods are rejected
    /// * `response` - The response to store
    pub async fn put(&self, request: &FetchRequest, response: FetchResponse) -> Result<()> {
        let key = RequestKey::from_request(request)?;
        self.put_key(key, response).await
    }

    /// Stores a response under `key`.
    ///
    /// Fails with `CacheFull` when `key` is new and the quota is reached.
    pub async fn put_key(&self, key: RequestKey, response: FetchResponse) -> Result<()> {
        let mut entries = self.entries.write().await;

        let is_overwrite = entries.contains_key(&key);
        if !is_overwrite && entries.len() >= self.max_entries {
            return Err(WorkerError::CacheFull(format!(
                "{} holds {} entries",
                self.name,
                entries.len()
            )));
        }

        entries.insert(key, CacheEntry::new(response));
        Ok(())
    }

    // == Delete ==
    /// Removes the entry for a request, returning whether one existed.
    pub async fn delete(&self, request: &FetchRequest) -> bool {
        match RequestKey::from_request(request) {
            Ok(key) => self.delete_key(&key).await,
            Err(_) => false,
        }
    }

    /// Removes the entry for `key`, returning whether one existed.
    pub async fn delete_key(&self, key: &RequestKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    // == Keys ==
    /// Returns every stored key, in no particular order.
    pub async fn keys(&self) -> Vec<RequestKey> {
        self.entries.read().await.keys().cloned().collect()
    }

    // == Entry ==
    /// Returns the stored entry for `key`, with its capture time.
    pub async fn entry(&self, key: &RequestKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    // == Evict By Capture Time ==
    /// Removes every entry captured before `cutoff`.
    ///
    /// Entries without a readable capture time are kept.
    /// Returns the number of entries removed.
    pub async fn remove_captured_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.captured_before(cutoff));
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use chrono::Duration;

    fn request(path: &str) -> FetchRequest {
        FetchRequest::get(Url::parse("http://localhost:3000").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let cache = Cache::new("test-v1", 10);
        cache
            .put(&request("/style.css"), FetchResponse::ok("body{}"))
            .await
            .unwrap();

        let found = cache.match_request(&request("/style.css")).await.unwrap();
        assert_eq!(&found.body[..], b"body{}");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_match_miss() {
        let cache = Cache::new("test-v1", 10);
        assert!(cache.match_request(&request("/missing.js")).await.is_none());
    }

    #[tokio::test]
    async fn test_non_get_never_matches_or_stores() {
        let cache = Cache::new("test-v1", 10);
        let post = FetchRequest::new(Method::POST, request("/api/send").url);

        assert!(cache.put(&post, FetchResponse::ok("x")).await.is_err());
        assert!(cache.match_request(&post).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let cache = Cache::new("test-v1", 10);
        cache.put(&request("/"), FetchResponse::ok("old")).await.unwrap();
        cache.put(&request("/"), FetchResponse::ok("new")).await.unwrap();

        let found = cache.match_request(&request("/")).await.unwrap();
        assert_eq!(&found.body[..], b"new");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_quota_rejects_new_keys_but_allows_overwrite() {
        let cache = Cache::new("test-v1", 1);
        cache.put(&request("/a.js"), FetchResponse::ok("a")).await.unwrap();

        let result = cache.put(&request("/b.js"), FetchResponse::ok("b")).await;
        assert!(matches!(result, Err(WorkerError::CacheFull(_))));

        assert!(cache.put(&request("/a.js"), FetchResponse::ok("a2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = Cache::new("test-v1", 10);
        cache.put(&request("/a.js"), FetchResponse::ok("a")).await.unwrap();

        assert!(cache.delete(&request("/a.js")).await);
        assert!(!cache.delete(&request("/a.js")).await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_captured_before() {
        let cache = Cache::new("test-v1", 10);
        let now = Utc::now();
        cache
            .put(&request("/old.js"), FetchResponse::ok("old").with_date(now - Duration::days(10)))
            .await
            .unwrap();
        cache
            .put(&request("/new.js"), FetchResponse::ok("new").with_date(now - Duration::days(1)))
            .await
            .unwrap();
        cache
            .put(&request("/undated.js"), FetchResponse::ok("undated"))
            .await
            .unwrap();

        let removed = cache.remove_captured_before(now - Duration::days(7)).await;
        assert_eq!(removed, 1);
        assert!(cache.match_request(&request("/old.js")).await.is_none());
        assert!(cache.match_request(&request("/new.js")).await.is_some());
        assert!(cache.match_request(&request("/undated.js")).await.is_some());
    }
}
