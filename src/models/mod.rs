//! Typed values crossing the worker boundary
//!
//! Fetch exchanges, control channel messages and push notifications are
//! parsed and validated here so handlers never inspect raw shapes.

pub mod fetch;
pub mod messages;
pub mod notification;
pub mod responses;

// Re-export commonly used types
pub use fetch::{
    format_http_date, parse_http_date, FetchRequest, FetchResponse, RequestDestination,
    RequestMode, ResponseType,
};
pub use messages::{ControlMessage, VersionReply};
pub use notification::{
    Notification, NotificationAction, NotificationClick, NotificationId, PushPayload,
};
pub use responses::{EventResponse, HealthResponse, PushResponse, StateResponse, StatsResponse};
