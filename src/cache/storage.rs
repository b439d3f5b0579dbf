//! Cache Storage Module
//!
//! The set of named cache stores belonging to one origin.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::Cache;

// == Cache Storage ==
/// Named stores in creation order.
#[derive(Debug)]
pub struct CacheStorage {
    caches: RwLock<Vec<Arc<Cache>>>,
    /// Entry quota applied to every store opened here
    max_entries: usize,
}

impl CacheStorage {
    /// Creates empty storage.
    ///
    /// # Arguments
    /// * `max_entries` - Entry quota for each store opened here
    pub fn new(max_entries: usize) -> Self {
        Self {
            caches: RwLock::new(Vec::new()),
            max_entries,
        }
    }

    /// Returns the store named `name`, creating it if needed.
    pub async fn open(&self, name: &str) -> Arc<Cache> {
        let mut caches = self.caches.write().await;
        if let Some(cache) = caches.iter().find(|c| c.name() == name) {
            return cache.clone();
        }

        let cache = Arc::new(Cache::new(name, self.max_entries));
        caches.push(cache.clone());
        cache
    }

    /// Returns the store named `name` without creating it.
    pub async fn get(&self, name: &str) -> Option<Arc<Cache>> {
        self.caches
            .read()
            .await
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.iter().any(|c| c.name() == name)
    }

    /// Deletes the store named `name`, returning whether it existed.
    pub async fn delete(&self, name: &str) -> bool {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|c| c.name() != name);
        caches.len() != before
    }

    /// Store names in creation order.
    pub async fn keys(&self) -> Vec<String> {
        self.caches
            .read()
            .await
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }
}
