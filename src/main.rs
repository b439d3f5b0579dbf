//! Offline Cache - an offline caching worker
//!
//! Runs the worker as a local edge in front of an upstream origin.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_cache::api::create_router;
use offline_cache::{spawn_periodic_sync_task, AppState, Config, WorkerEvent};

/// Main entry point for the offline cache host.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the worker and run install (activation follows per config)
/// 4. Start the periodic sync timer
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting offline cache worker");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache={}, origin={}, upstream={}, port={}, precache={} URLs",
        config.cache_name(),
        config.origin,
        config.upstream,
        config.server_port,
        config.precache_urls.len()
    );

    let state = AppState::from_config(&config);

    // A failed install leaves the worker installing; POST /__worker/install retries
    if let Err(e) = state.worker.dispatch(WorkerEvent::Install).await {
        error!("Install failed, serving pass-through until retried: {}", e);
    }

    let sync_handle = spawn_periodic_sync_task(state.worker.clone(), config.periodic_sync_interval);
    info!("Periodic sync task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sync_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the periodic sync task and allows graceful shutdown.
async fn shutdown_signal(sync_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sync_handle.abort();
    warn!("Periodic sync task aborted");
}
