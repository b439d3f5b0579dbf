//! API Routes
//!
//! Configures the Axum router: control endpoints under `/__worker`, and a
//! fallback that sends everything else through the worker.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activate_handler, health_handler, install_handler, message_handler,
    notification_click_handler, periodic_sync_handler, proxy_handler, push_handler,
    stats_handler, sync_handler, AppState,
};

/// Path prefix reserved for worker control endpoints.
pub const CONTROL_PREFIX: &str = "/__worker";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /__worker/health` - Health check
/// - `GET /__worker/stats` - Lifecycle state and routing counters
/// - `POST /__worker/install` - Run (or retry) install
/// - `POST /__worker/activate` - Activate a waiting worker
/// - `POST /__worker/message` - Post a control message, returns the reply
/// - `POST /__worker/push` - Deliver a push payload
/// - `POST /__worker/sync/:tag` - Fire background sync
/// - `POST /__worker/periodic-sync/:tag` - Fire periodic sync
/// - `POST /__worker/notification-click` - Click a notification
/// - anything else - Fetch event
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let control = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/install", post(install_handler))
        .route("/activate", post(activate_handler))
        .route("/message", post(message_handler))
        .route("/push", post(push_handler))
        .route("/sync/:tag", post(sync_handler))
        .route("/periodic-sync/:tag", post(periodic_sync_handler))
        .route("/notification-click", post(notification_click_handler))
        .layer(cors);

    Router::new()
        .nest(CONTROL_PREFIX, control)
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
