//! Offline Cache - an offline caching worker
//!
//! Precaches a versioned app shell, serves documents network-first and
//! static assets cache-first, evicts week-old entries on periodic sync, and
//! turns push messages into notifications.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod tasks;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, WorkerError};
pub use tasks::spawn_periodic_sync_task;
pub use worker::{EventOutcome, OfflineCacheWorker, WorkerEvent, WorkerState};
