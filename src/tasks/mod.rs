//! Background Tasks Module
//!
//! Handlers for work the platform schedules outside of page requests.
//!
//! # Tasks
//! - Background sync: best-effort flush through a `SyncHandler`
//! - Cache janitor: evicts entries older than the max age on periodic sync
//! - Push display and notification-click routing
//! - Periodic sync timer for the server host

mod periodic;
mod push;
mod sync;

pub use periodic::spawn_periodic_sync_task;
pub use push::{route_notification_click, show_push};
pub use sync::{run_background_sync, run_janitor, NoopSync, SyncHandler};
