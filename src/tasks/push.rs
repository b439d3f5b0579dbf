//! Push notification display and notification-click routing.

use tracing::{debug, info, warn};
use url::Url;

use crate::config::NotificationDefaults;
use crate::error::{Result, WorkerError};
use crate::host::{Clients, Notifier};
use crate::models::{Notification, NotificationClick, NotificationId, PushPayload};

/// Displays exactly one notification for a push message.
///
/// Undecodable payloads degrade to a plain-text body with default title and
/// icon.
pub async fn show_push(
    notifier: &dyn Notifier,
    data: &[u8],
    defaults: &NotificationDefaults,
) -> Result<NotificationId> {
    let (payload, fell_back) = PushPayload::decode(data);
    if fell_back {
        warn!("Push payload is not JSON, showing it as plain text");
    }

    let notification = Notification::from_payload(payload, defaults);
    info!("Push received: {}", notification.title);
    notifier.show(notification).await
}

/// Handles a click on a notification.
///
/// The notification is always closed. "open" (or a click on the body) focuses
/// a client already showing the target URL, or opens a new one. The target is
/// the click's URL, else the URL the notification was shown with, else
/// `default_url`.
pub async fn route_notification_click(
    notifier: &dyn Notifier,
    clients: &dyn Clients,
    origin: &Url,
    click: NotificationClick,
    default_url: &str,
) -> Result<()> {
    let closed = match notifier.close(click.id).await {
        Ok(closed) => closed,
        Err(e) => {
            warn!("Failed to close notification {}: {}", click.id, e);
            None
        }
    };

    match click.action.as_deref() {
        None | Some(Notification::OPEN_ACTION) => {}
        Some(Notification::CLOSE_ACTION) => {
            debug!("Notification {} dismissed", click.id);
            return Ok(());
        }
        Some(other) => {
            debug!("Ignoring unknown notification action {}", other);
            return Ok(());
        }
    }

    let target = click
        .url
        .as_deref()
        .or(closed.as_ref().map(|n| n.url.as_str()))
        .unwrap_or(default_url);
    let target_url = origin
        .join(target)
        .map_err(|e| WorkerError::InvalidRequest(format!("bad notification URL {}: {}", target, e)))?;

    for client in clients.match_all().await? {
        let shows_target = client.url == target
            || Url::parse(&client.url).is_ok_and(|u| u == target_url);
        if shows_target {
            info!("Focusing client {} at {}", client.id, client.url);
            return clients.focus(&client.id).await;
        }
    }

    info!("Opening new window at {}", target_url);
    clients.open_window(target_url.as_str()).await
}
