//! Host Platform Module
//!
//! The collaborators the worker relies on but does not own: the network,
//! the open page clients and the notification surface.
//!
//! # Implementations
//! - `HttpNetwork`: reqwest client forwarding same-origin traffic upstream
//! - `MemoryNetwork`, `MemoryClients`, `MemoryNotifier`: in-process hosts

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FetchRequest, FetchResponse, Notification, NotificationId};

pub use self::http::HttpNetwork;
pub use memory::{MemoryClients, MemoryNetwork, MemoryNotifier};

/// Performs real network fetches.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Resolves to a response for any HTTP status; errors only when no
    /// response could be obtained at all.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

/// A page (window) controlled or controllable by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// Open page clients of the worker's origin.
#[async_trait]
pub trait Clients: Send + Sync + 'static {
    async fn match_all(&self) -> Result<Vec<WindowClient>>;
    async fn focus(&self, id: &str) -> Result<()>;
    async fn open_window(&self, url: &str) -> Result<()>;
    /// Takes control of every open client, returning how many were claimed.
    async fn claim(&self) -> Result<usize>;
}

/// Displays and dismisses notifications.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn show(&self, notification: Notification) -> Result<NotificationId>;
    /// Dismisses a notification, returning it if it was still on screen.
    async fn close(&self, id: NotificationId) -> Result<Option<Notification>>;
}
