//! In-process host implementations.
//!
//! `MemoryNetwork` serves canned responses and can be switched offline,
//! which makes it the network double for router tests. `MemoryClients` and
//! `MemoryNotifier` record what the worker asked of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::RwLock;
use tracing::info;
use url::Url;

use crate::cache::RequestKey;
use crate::error::{Result, WorkerError};
use crate::host::{Clients, Network, Notifier, WindowClient};
use crate::models::{FetchRequest, FetchResponse, Notification, NotificationId};

// == Memory Network ==
/// Canned responses keyed by URL.
#[derive(Debug)]
pub struct MemoryNetwork {
    routes: RwLock<HashMap<String, FetchResponse>>,
    online: AtomicBool,
    fetches: AtomicUsize,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Builder form of `set_route`.
    pub fn with_route(mut self, url: &Url, response: FetchResponse) -> Self {
        self.routes
            .get_mut()
            .insert(RequestKey::get(url).url, response);
        self
    }

    pub async fn set_route(&self, url: &Url, response: FetchResponse) {
        self.routes
            .write()
            .await
            .insert(RequestKey::get(url).url, response);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of fetch attempts seen, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for MemoryNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if !self.online.load(Ordering::SeqCst) {
            return Err(WorkerError::Network(format!(
                "offline: {} {}",
                request.method, request.url
            )));
        }

        let key = RequestKey::get(&request.url).url;
        Ok(self
            .routes
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| FetchResponse::new(StatusCode::NOT_FOUND, "Not Found")))
    }
}

// == Memory Clients ==
/// Window clients held in memory, recording focus, open and claim requests.
#[derive(Debug, Default)]
pub struct MemoryClients {
    windows: RwLock<Vec<WindowClient>>,
    focused: RwLock<Vec<String>>,
    opened: RwLock<Vec<String>>,
    claims: AtomicUsize,
}

impl MemoryClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, id: &str, url: &str) -> Self {
        self.windows.get_mut().push(WindowClient {
            id: id.to_string(),
            url: url.to_string(),
        });
        self
    }

    /// Ids of focused clients, in call order.
    pub async fn focused(&self) -> Vec<String> {
        self.focused.read().await.clone()
    }

    /// URLs of opened windows, in call order.
    pub async fn opened(&self) -> Vec<String> {
        self.opened.read().await.clone()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clients for MemoryClients {
    async fn match_all(&self) -> Result<Vec<WindowClient>> {
        Ok(self.windows.read().await.clone())
    }

    async fn focus(&self, id: &str) -> Result<()> {
        if !self.windows.read().await.iter().any(|w| w.id == id) {
            return Err(WorkerError::Client(format!("no client with id {}", id)));
        }
        self.focused.write().await.push(id.to_string());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<()> {
        self.opened.write().await.push(url.to_string());
        let mut windows = self.windows.write().await;
        let id = format!("window-{}", windows.len() + 1);
        windows.push(WindowClient {
            id,
            url: url.to_string(),
        });
        Ok(())
    }

    async fn claim(&self) -> Result<usize> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(self.windows.read().await.len())
    }
}

// == Memory Notifier ==
/// Keeps displayed notifications in memory and logs them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    visible: RwLock<Vec<(NotificationId, Notification)>>,
    shown: AtomicUsize,
    next_id: AtomicU64,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently on screen.
    pub async fn visible(&self) -> Vec<(NotificationId, Notification)> {
        self.visible.read().await.clone()
    }

    /// Total notifications ever shown.
    pub fn shown_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn show(&self, notification: Notification) -> Result<NotificationId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Notification {}: {} - {}",
            id, notification.title, notification.body
        );
        self.visible.write().await.push((id, notification));
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn close(&self, id: NotificationId) -> Result<Option<Notification>> {
        let mut visible = self.visible.write().await;
        Ok(visible
            .iter()
            .position(|(shown, _)| *shown == id)
            .map(|index| visible.remove(index).1))
    }
}
