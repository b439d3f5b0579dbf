//! API Handlers
//!
//! The fetch proxy and the control endpoints that raise worker events.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::config::Config;
use crate::error::{Result, WorkerError};
use crate::host::{HttpNetwork, MemoryClients, MemoryNotifier};
use crate::models::{
    EventResponse, FetchRequest, FetchResponse, HealthResponse, NotificationClick, PushResponse,
    RequestDestination, RequestMode, StateResponse, StatsResponse,
};
use crate::worker::{EventOutcome, OfflineCacheWorker, WorkerEvent};

/// Largest request body forwarded through the proxy.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<OfflineCacheWorker>,
}

impl AppState {
    pub fn new(worker: OfflineCacheWorker) -> Self {
        Self {
            worker: Arc::new(worker),
        }
    }

    /// Creates a worker backed by the upstream network described in `config`.
    pub fn from_config(config: &Config) -> Self {
        let network = HttpNetwork::new(config.origin.clone(), config.upstream.clone());
        let worker = OfflineCacheWorker::new(
            config.clone(),
            Arc::new(network),
            Arc::new(MemoryClients::new()),
            Arc::new(MemoryNotifier::new()),
        );
        Self::new(worker)
    }
}

impl IntoResponse for FetchResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Converts an incoming request into the worker's view of it, addressed at
/// the worker's origin.
async fn to_fetch_request(config: &Config, request: Request) -> Result<FetchRequest> {
    let (parts, body) = request.into_parts();

    let mut url = config.origin.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let mode = RequestMode::from_sec_fetch_mode(header_str(&parts.headers, "sec-fetch-mode"));
    let destination =
        RequestDestination::from_sec_fetch_dest(header_str(&parts.headers, "sec-fetch-dest"));

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| WorkerError::InvalidRequest(e.to_string()))?;

    Ok(FetchRequest {
        method: parts.method,
        url,
        headers: parts.headers,
        mode,
        destination,
        body,
    })
}

/// Fallback handler: every request outside the control prefix is a fetch event.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let request = to_fetch_request(state.worker.config(), request).await?;

    let outcome = state
        .worker
        .dispatch(WorkerEvent::Fetch(request.clone()))
        .await?;

    match outcome {
        EventOutcome::Response(response) => Ok(response.into_response()),
        _ => {
            let response = state.worker.network().fetch(&request).await?;
            Ok(response.into_response())
        }
    }
}

/// Handler for POST /__worker/install
///
/// Retries a failed install; precache failures map to 503.
pub async fn install_handler(State(state): State<AppState>) -> Result<Json<StateResponse>> {
    state.worker.dispatch(WorkerEvent::Install).await?;
    Ok(Json(StateResponse::new(
        state.worker.state().await,
        state.worker.cache_name(),
    )))
}

/// Handler for POST /__worker/activate
pub async fn activate_handler(State(state): State<AppState>) -> Result<Json<StateResponse>> {
    state.worker.dispatch(WorkerEvent::Activate).await?;
    Ok(Json(StateResponse::new(
        state.worker.state().await,
        state.worker.cache_name(),
    )))
}

/// Handler for POST /__worker/message
///
/// Replies with the message port's answer, or 204 if there is none.
pub async fn message_handler(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Response> {
    let (tx, rx) = oneshot::channel();
    state
        .worker
        .dispatch(WorkerEvent::Message {
            data,
            reply: Some(tx),
        })
        .await?;

    Ok(match rx.await {
        Ok(reply) => Json(reply).into_response(),
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handler for POST /__worker/push
///
/// The raw request body is the push payload.
pub async fn push_handler(
    State(state): State<AppState>,
    data: Bytes,
) -> Result<Json<PushResponse>> {
    match state.worker.dispatch(WorkerEvent::Push { data }).await? {
        EventOutcome::Notified(notification) => Ok(Json(PushResponse { notification })),
        other => Err(WorkerError::Notification(format!(
            "push produced no notification: {:?}",
            other
        ))),
    }
}

/// Handler for POST /__worker/sync/:tag
pub async fn sync_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<EventResponse>> {
    let event = WorkerEvent::Sync { tag };
    let kind = event.kind();
    let outcome = state.worker.dispatch(event).await?;
    Ok(Json(EventResponse::new(
        kind,
        !matches!(outcome, EventOutcome::Ignored),
    )))
}

/// Handler for POST /__worker/periodic-sync/:tag
pub async fn periodic_sync_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<EventResponse>> {
    let event = WorkerEvent::PeriodicSync { tag };
    let kind = event.kind();
    let outcome = state.worker.dispatch(event).await?;
    Ok(Json(EventResponse::new(
        kind,
        !matches!(outcome, EventOutcome::Ignored),
    )))
}

/// Handler for POST /__worker/notification-click
pub async fn notification_click_handler(
    State(state): State<AppState>,
    Json(click): Json<NotificationClick>,
) -> Result<Json<EventResponse>> {
    let event = WorkerEvent::NotificationClick(click);
    let kind = event.kind();
    state.worker.dispatch(event).await?;
    Ok(Json(EventResponse::new(kind, true)))
}

/// Handler for GET /__worker/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let worker = &state.worker;
    let stats = worker.stats().await;
    let reply = worker.version_reply();
    let entries = match worker.storage().get(worker.cache_name()).await {
        Some(cache) => cache.len().await,
        None => 0,
    };

    Json(StatsResponse {
        state: worker.state().await.to_string(),
        version: reply.version,
        cache: reply.cache,
        entries,
        caches: worker.storage().keys().await,
        hit_rate: stats.hit_rate(),
        stats,
    })
}

/// Handler for GET /__worker/health
pub async fn health_handler() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(HealthResponse::healthy()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryNetwork;
    use url::Url;

    fn state_with(network: MemoryNetwork) -> AppState {
        let config = Config {
            precache_urls: vec!["/".to_string()],
            ..Config::default()
        };
        AppState::new(OfflineCacheWorker::new(
            config,
            Arc::new(network),
            Arc::new(MemoryClients::new()),
            Arc::new(MemoryNotifier::new()),
        ))
    }

    fn root() -> Url {
        Url::parse("http://localhost:3000/").unwrap()
    }

    #[tokio::test]
    async fn test_install_handler() {
        let state = state_with(MemoryNetwork::new().with_route(&root(), FetchResponse::ok("shell")));

        let response = install_handler(State(state)).await.unwrap();
        assert_eq!(response.state, "active");
        assert_eq!(response.cache, "quantum-chat-v2.1");
    }

    #[tokio::test]
    async fn test_install_handler_precache_failure() {
        let state = state_with(MemoryNetwork::new());
        let result = install_handler(State(state)).await;
        assert!(matches!(result, Err(WorkerError::Precache { .. })));
    }

    #[tokio::test]
    async fn test_push_handler() {
        let state = state_with(MemoryNetwork::new());
        let response = push_handler(State(state), Bytes::from_static(b"plain text"))
            .await
            .unwrap();
        assert_eq!(response.notification, 1);
    }

    #[tokio::test]
    async fn test_sync_handler_ignores_unknown_tag() {
        let state = state_with(MemoryNetwork::new());
        let response = sync_handler(State(state), Path("unknown".to_string()))
            .await
            .unwrap();
        assert_eq!(response.event, "sync");
        assert_eq!(response.outcome, "ignored");
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state_with(MemoryNetwork::new());
        let response = stats_handler(State(state)).await;
        assert_eq!(response.state, "installing");
        assert_eq!(response.stats.hits, 0);
    }
}
