//! Event Dispatch
//!
//! Every platform event is a [`WorkerEvent`] value; [`OfflineCacheWorker::dispatch`]
//! maps its kind to a handler and returns once all of the handler's cache and
//! network work has settled.

use std::fmt;

use axum::body::Bytes;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::models::{
    ControlMessage, FetchRequest, FetchResponse, NotificationClick, NotificationId, VersionReply,
};
use crate::tasks::{route_notification_click, run_background_sync, run_janitor, show_push};
use crate::worker::OfflineCacheWorker;

// == Worker Event ==
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    Sync {
        tag: String,
    },
    PeriodicSync {
        tag: String,
    },
    Push {
        data: Bytes,
    },
    NotificationClick(NotificationClick),
    /// A page message, with the port a reply is posted to
    Message {
        data: Value,
        reply: Option<oneshot::Sender<VersionReply>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
    PeriodicSync,
    Push,
    NotificationClick,
    Message,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Sync => "sync",
            EventKind::PeriodicSync => "periodicsync",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
            EventKind::Message => "message",
        };
        f.write_str(name)
    }
}

impl WorkerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkerEvent::Install => EventKind::Install,
            WorkerEvent::Activate => EventKind::Activate,
            WorkerEvent::Fetch(_) => EventKind::Fetch,
            WorkerEvent::Sync { .. } => EventKind::Sync,
            WorkerEvent::PeriodicSync { .. } => EventKind::PeriodicSync,
            WorkerEvent::Push { .. } => EventKind::Push,
            WorkerEvent::NotificationClick(_) => EventKind::NotificationClick,
            WorkerEvent::Message { .. } => EventKind::Message,
        }
    }
}

// == Event Outcome ==
#[derive(Debug)]
pub enum EventOutcome {
    /// The handler ran to completion
    Completed,
    /// A fetch was answered by the worker
    Response(FetchResponse),
    /// A fetch was not intercepted; the host sends it to the network
    Passthrough,
    /// A push produced this notification
    Notified(NotificationId),
    /// Unrecognized tag or message, nothing done
    Ignored,
}

impl OfflineCacheWorker {
    // == Dispatch ==
    /// Runs the handler for `event`.
    ///
    /// Install and activate failures are returned so the host can retry.
    /// Sync failures are logged and reported as completed.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome> {
        debug!("Dispatching {} event", event.kind());

        match event {
            WorkerEvent::Install => self.install().await.map(|_| EventOutcome::Completed),
            WorkerEvent::Activate => self.activate().await.map(|_| EventOutcome::Completed),
            WorkerEvent::Fetch(request) => Ok(match self.handle_fetch(&request).await {
                Some(response) => EventOutcome::Response(response),
                None => EventOutcome::Passthrough,
            }),
            WorkerEvent::Sync { tag } => Ok(self.on_sync(&tag).await),
            WorkerEvent::PeriodicSync { tag } => Ok(self.on_periodic_sync(&tag).await),
            WorkerEvent::Push { data } => {
                show_push(self.notifier.as_ref(), &data, &self.config.notification)
                    .await
                    .map(EventOutcome::Notified)
            }
            WorkerEvent::NotificationClick(click) => route_notification_click(
                self.notifier.as_ref(),
                self.clients.as_ref(),
                &self.config.origin,
                click,
                &self.config.notification.url,
            )
            .await
            .map(|_| EventOutcome::Completed),
            WorkerEvent::Message { data, reply } => self.on_message(&data, reply).await,
        }
    }

    async fn on_sync(&self, tag: &str) -> EventOutcome {
        if tag != self.config.sync_tag {
            debug!("Ignoring sync tag {}", tag);
            return EventOutcome::Ignored;
        }
        run_background_sync(self.sync_handler.as_ref()).await;
        EventOutcome::Completed
    }

    async fn on_periodic_sync(&self, tag: &str) -> EventOutcome {
        if tag != self.config.periodic_sync_tag {
            debug!("Ignoring periodic sync tag {}", tag);
            return EventOutcome::Ignored;
        }

        info!("Periodic sync triggered");
        let cache = self.current_cache().await;
        if let Err(e) = run_janitor(&cache, self.config.cache_max_age(), Utc::now()).await {
            error!("Periodic sync failed: {}", e);
        }
        EventOutcome::Completed
    }

    async fn on_message(
        &self,
        data: &Value,
        reply: Option<oneshot::Sender<VersionReply>>,
    ) -> Result<EventOutcome> {
        match ControlMessage::parse(data) {
            Some(ControlMessage::SkipWaiting) => {
                info!("Skip waiting requested by page");
                self.skip_waiting().await?;
                Ok(EventOutcome::Completed)
            }
            Some(ControlMessage::GetVersion) => {
                match reply {
                    Some(port) => {
                        if port.send(self.version_reply()).is_err() {
                            debug!("Version reply port closed before reply");
                        }
                    }
                    None => debug!("GET_VERSION without reply port"),
                }
                Ok(EventOutcome::Completed)
            }
            None => {
                debug!("Ignoring unrecognized message {}", data);
                Ok(EventOutcome::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RequestKey;
    use crate::models::NotificationClick;
    use crate::worker::test_support::*;
    use crate::worker::WorkerState;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_install_then_fetch() {
        let h = harness(test_config(), shell_network());
        let outcome = h.worker.dispatch(WorkerEvent::Install).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Completed));

        let outcome = h
            .worker
            .dispatch(WorkerEvent::Fetch(FetchRequest::get(url("/app.js"))))
            .await
            .unwrap();
        match outcome {
            EventOutcome::Response(response) => assert_eq!(&response.body[..], b"console.log(1)"),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_non_get_passes_through() {
        let h = active_harness().await;
        let request = FetchRequest::new(axum::http::Method::POST, url("/api/send"));

        let outcome = h.worker.dispatch(WorkerEvent::Fetch(request)).await.unwrap();
        assert!(matches!(outcome, EventOutcome::Passthrough));
    }

    #[tokio::test]
    async fn test_get_version_replies() {
        let h = active_harness().await;
        let (tx, rx) = oneshot::channel();

        h.worker
            .dispatch(WorkerEvent::Message {
                data: json!({"type": "GET_VERSION"}),
                reply: Some(tx),
            })
            .await
            .unwrap();

        let reply = rx.await.unwrap();
        assert_eq!(reply.version, "v2.1");
        assert_eq!(reply.cache, "quantum-chat-v2.1");
    }

    #[tokio::test]
    async fn test_unknown_message_is_ignored() {
        let h = active_harness().await;
        let outcome = h
            .worker
            .dispatch(WorkerEvent::Message {
                data: json!({"type": "REFRESH"}),
                reply: None,
            })
            .await
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates() {
        let config = crate::config::Config {
            skip_waiting_on_install: false,
            ..test_config()
        };
        let h = harness(config, shell_network());
        h.worker.dispatch(WorkerEvent::Install).await.unwrap();
        assert_eq!(h.worker.state().await, WorkerState::Waiting);

        h.worker
            .dispatch(WorkerEvent::Message {
                data: json!({"type": "SKIP_WAITING"}),
                reply: None,
            })
            .await
            .unwrap();
        assert_eq!(h.worker.state().await, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_periodic_sync_runs_janitor_on_tag_only() {
        let h = active_harness().await;
        let cache = h.worker.current_cache().await;
        cache
            .put_key(
                RequestKey::get(&url("/old.css")),
                FetchResponse::ok("old").with_date(Utc::now() - chrono::Duration::days(10)),
            )
            .await
            .unwrap();

        let outcome = h
            .worker
            .dispatch(WorkerEvent::PeriodicSync { tag: "other".to_string() })
            .await
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Ignored));
        assert!(cache.match_url(&url("/old.css")).await.is_some());

        h.worker
            .dispatch(WorkerEvent::PeriodicSync { tag: "periodic-sync".to_string() })
            .await
            .unwrap();
        assert!(cache.match_url(&url("/old.css")).await.is_none());
    }

    #[tokio::test]
    async fn test_background_sync_completes() {
        let h = active_harness().await;
        let outcome = h
            .worker
            .dispatch(WorkerEvent::Sync { tag: "background-sync".to_string() })
            .await
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Completed));
    }

    #[tokio::test]
    async fn test_push_and_click_flow() {
        let h = active_harness().await;
        let outcome = h
            .worker
            .dispatch(WorkerEvent::Push {
                data: Bytes::from_static(br#"{"title":"Alice","body":"hi"}"#),
            })
            .await
            .unwrap();
        let id = match outcome {
            EventOutcome::Notified(id) => id,
            other => panic!("expected notification, got {:?}", other),
        };

        h.worker
            .dispatch(WorkerEvent::NotificationClick(NotificationClick {
                id,
                action: Some("open".to_string()),
                url: None,
            }))
            .await
            .unwrap();

        assert!(h.notifier.visible().await.is_empty());
        assert_eq!(h.clients.opened().await, vec!["http://localhost:3000/".to_string()]);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::PeriodicSync.to_string(), "periodicsync");
        assert_eq!(WorkerEvent::Install.kind(), EventKind::Install);
    }
}
