//! API Module
//!
//! HTTP host for the worker: a local offline-caching edge in front of an
//! upstream origin, plus endpoints that raise the platform events a browser
//! would raise.
//!
//! # Endpoints
//! - `/__worker/*` - Lifecycle, message, push, sync, click, stats, health
//! - everything else - Routed through the worker as a fetch event

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, CONTROL_PREFIX};
