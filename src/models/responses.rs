//! Response DTOs for the worker host's control endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::NotificationId;

/// Response body for lifecycle endpoints (POST /__worker/install, /activate)
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    /// Lifecycle state after the operation
    pub state: String,
    /// Name of the current cache store
    pub cache: String,
}

impl StateResponse {
    pub fn new(state: impl ToString, cache: impl Into<String>) -> Self {
        Self {
            state: state.to_string(),
            cache: cache.into(),
        }
    }
}

/// Response body for sync and click endpoints
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    /// Event kind that was dispatched
    pub event: String,
    /// "completed" or "ignored"
    pub outcome: String,
}

impl EventResponse {
    pub fn new(event: impl ToString, handled: bool) -> Self {
        Self {
            event: event.to_string(),
            outcome: if handled { "completed" } else { "ignored" }.to_string(),
        }
    }
}

/// Response body for POST /__worker/push
#[derive(Debug, Clone, Serialize)]
pub struct PushResponse {
    /// Id of the displayed notification
    pub notification: NotificationId,
}

/// Response body for the stats endpoint (GET /__worker/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub state: String,
    pub version: String,
    pub cache: String,
    /// Entries in the current store
    pub entries: usize,
    /// Names of every store, current one included
    pub caches: Vec<String>,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Response body for the health endpoint (GET /__worker/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
