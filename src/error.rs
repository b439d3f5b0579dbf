//! Error types for the offline cache worker
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::worker::WorkerState;

// == Worker Error Enum ==
/// Unified error type for the worker and its host.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Network fetch failed before a response was produced
    #[error("Network error: {0}")]
    Network(String),

    /// A precache manifest entry could not be fetched during install
    #[error("Precache failed for {url}: {reason}")]
    Precache { url: String, reason: String },

    /// A lifecycle operation was attempted from the wrong state
    #[error("Invalid worker state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: WorkerState,
    },

    /// Malformed or unsupported request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The cache store reached its entry quota
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Notification display or close failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Window client lookup, focus, open or claim failed
    #[error("Client error: {0}")]
    Client(String),

    /// Background synchronization routine failed
    #[error("Sync error: {0}")]
    Sync(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkerError::Network(_) => StatusCode::BAD_GATEWAY,
            WorkerError::Precache { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WorkerError::InvalidState { .. } => StatusCode::CONFLICT,
            WorkerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WorkerError::CacheFull(_) => StatusCode::INSUFFICIENT_STORAGE,
            WorkerError::Notification(_)
            | WorkerError::Client(_)
            | WorkerError::Sync(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the worker.
pub type Result<T> = std::result::Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precache_error_message() {
        let err = WorkerError::Precache {
            url: "/style.css".to_string(),
            reason: "status 404".to_string(),
        };
        assert_eq!(err.to_string(), "Precache failed for /style.css: status 404");
    }

    #[test]
    fn test_invalid_state_status_code() {
        let err = WorkerError::InvalidState {
            expected: "waiting",
            actual: WorkerState::Installing,
        };
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_network_error_status_code() {
        let response = WorkerError::Network("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
