//! Request Router
//!
//! Documents are served network-first, everything else cache-first. Each
//! request makes at most one network attempt and at most one cache write.

use axum::http::{Method, StatusCode};
use tracing::{debug, error, warn};

use crate::cache::Cache;
use crate::models::{FetchRequest, FetchResponse, RequestDestination, ResponseType};
use crate::worker::lifecycle::resolve;
use crate::worker::OfflineCacheWorker;

/// Strategy chosen for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted; goes straight to the network
    Passthrough,
    NetworkFirst,
    CacheFirst,
}

impl OfflineCacheWorker {
    // == Classify ==
    pub fn classify(&self, request: &FetchRequest) -> Route {
        if request.method != Method::GET
            || !matches!(request.url.scheme(), "http" | "https")
            || request.is_websocket_upgrade()
        {
            return Route::Passthrough;
        }

        let url = request.url.as_str();
        if self
            .config
            .bypass_markers
            .iter()
            .any(|marker| url.contains(marker.as_str()))
        {
            return Route::Passthrough;
        }

        if request.is_document() {
            Route::NetworkFirst
        } else {
            Route::CacheFirst
        }
    }

    // == Handle Fetch ==
    /// Routes an intercepted request.
    ///
    /// Returns `None` when the worker does not intercept the request, either
    /// because it is not active yet or because the request is passed through.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        let route = if self.state().await.can_intercept_fetch() {
            self.classify(request)
        } else {
            Route::Passthrough
        };
        debug!("{} {} -> {:?}", request.method, request.url, route);

        match route {
            Route::Passthrough => {
                self.stats.write().await.record_passthrough();
                None
            }
            Route::NetworkFirst => Some(self.network_first(request).await),
            Route::CacheFirst => Some(self.cache_first(request).await),
        }
    }

    // == Network First ==
    async fn network_first(&self, request: &FetchRequest) -> FetchResponse {
        let cache = self.current_cache().await;

        match self.network.fetch(request).await {
            Ok(response) => {
                self.stats.write().await.record_fetch(true);
                if response.status == StatusCode::OK
                    && response.response_type == ResponseType::Basic
                {
                    self.write_back(&cache, request, response.clone()).await;
                }
                response
            }
            Err(e) => {
                self.stats.write().await.record_fetch(false);
                warn!("Network failed for {}, falling back to cache: {}", request.url, e);

                if let Some(cached) = cache.match_request(request).await {
                    self.stats.write().await.record_hit();
                    return cached;
                }

                self.stats.write().await.record_offline_fallback();
                match self.offline_document(&cache).await {
                    Some(shell) => shell,
                    None => FetchResponse::network_offline(),
                }
            }
        }
    }

    async fn offline_document(&self, cache: &Cache) -> Option<FetchResponse> {
        match resolve(&self.config.origin, &self.config.offline_document) {
            Ok(url) => cache.match_url(&url).await,
            Err(e) => {
                error!("Offline document is not a valid URL: {}", e);
                None
            }
        }
    }

    // == Cache First ==
    async fn cache_first(&self, request: &FetchRequest) -> FetchResponse {
        let cache = self.current_cache().await;

        if let Some(cached) = cache.match_request(request).await {
            self.stats.write().await.record_hit();
            return cached;
        }
        self.stats.write().await.record_miss();

        match self.network.fetch(request).await {
            Ok(response) => {
                self.stats.write().await.record_fetch(true);
                if response.is_cacheable() && request.is_same_origin(&self.config.origin) {
                    self.write_back(&cache, request, response.clone()).await;
                }
                response
            }
            Err(e) => {
                self.stats.write().await.record_fetch(false);
                warn!("Network failed for {}: {}", request.url, e);

                if matches!(
                    request.destination,
                    RequestDestination::Script | RequestDestination::Style
                ) {
                    if let Some(cached) = cache.match_request(request).await {
                        self.stats.write().await.record_hit();
                        return cached;
                    }
                }

                self.stats.write().await.record_offline_fallback();
                FetchResponse::network_offline()
            }
        }
    }

    /// Stores a copy of a network response. Failures are logged and ignored.
    async fn write_back(&self, cache: &Cache, request: &FetchRequest, response: FetchResponse) {
        let result = cache.put(request, response).await;
        if let Err(e) = &result {
            error!("Cache write failed for {}: {}", request.url, e);
        }
        self.stats.write().await.record_write(result.is_ok());
    }
}
