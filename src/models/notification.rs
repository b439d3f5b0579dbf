//! Push payloads and the notifications built from them.

use serde::{Deserialize, Serialize};

use crate::config::NotificationDefaults;

/// Decoded push message body. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    /// Decodes raw push data.
    ///
    /// A JSON object fills the typed fields, a bare JSON string becomes the
    /// body, and anything else is read as plain UTF-8 body text. Returns the
    /// payload and whether it had to fall back to plain text.
    pub fn decode(data: &[u8]) -> (Self, bool) {
        if data.is_empty() {
            return (Self::default(), false);
        }

        if let Ok(payload) = serde_json::from_slice::<PushPayload>(data) {
            return (payload, false);
        }

        if let Ok(text) = serde_json::from_slice::<String>(data) {
            return (Self::text(text), false);
        }

        let text = String::from_utf8_lossy(data).trim().to_string();
        (Self::text(text), true)
    }

    fn text(body: String) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification as handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Page to open or focus on click
    pub url: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    pub const OPEN_ACTION: &'static str = "open";
    pub const CLOSE_ACTION: &'static str = "close";

    /// Fills unset payload fields from the configured defaults.
    pub fn from_payload(payload: PushPayload, defaults: &NotificationDefaults) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| defaults.title.clone()),
            body: payload.body.unwrap_or_else(|| defaults.body.clone()),
            icon: payload.icon.unwrap_or_else(|| defaults.icon.clone()),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            url: payload.url.unwrap_or_else(|| defaults.url.clone()),
            actions: vec![
                NotificationAction {
                    action: Self::OPEN_ACTION.to_string(),
                    title: defaults.open_action_title.clone(),
                },
                NotificationAction {
                    action: Self::CLOSE_ACTION.to_string(),
                    title: defaults.close_action_title.clone(),
                },
            ],
        }
    }
}

/// Host-assigned handle of a displayed notification.
pub type NotificationId = u64;

/// A click on a displayed notification or one of its actions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationClick {
    pub id: NotificationId,
    /// `None` when the notification body itself was clicked
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_object() {
        let (payload, fell_back) =
            PushPayload::decode(br#"{"title":"Alice","body":"hi","url":"/chat/1"}"#);
        assert!(!fell_back);
        assert_eq!(payload.title.as_deref(), Some("Alice"));
        assert_eq!(payload.body.as_deref(), Some("hi"));
        assert_eq!(payload.url.as_deref(), Some("/chat/1"));
        assert!(payload.icon.is_none());
    }

    #[test]
    fn test_decode_plain_text() {
        let (payload, fell_back) = PushPayload::decode(b"plain text");
        assert!(fell_back);
        assert_eq!(payload.body.as_deref(), Some("plain text"));
        assert!(payload.title.is_none());
    }

    #[test]
    fn test_decode_json_string() {
        let (payload, fell_back) = PushPayload::decode(br#""plain text""#);
        assert!(!fell_back);
        assert_eq!(payload.body.as_deref(), Some("plain text"));
    }

    #[test]
    fn test_decode_empty() {
        let (payload, _) = PushPayload::decode(b"");
        assert_eq!(payload, PushPayload::default());
    }

    #[test]
    fn test_notification_defaults() {
        let defaults = NotificationDefaults::default();
        let notification = Notification::from_payload(PushPayload::default(), &defaults);

        assert_eq!(notification.title, defaults.title);
        assert_eq!(notification.body, defaults.body);
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.url, "/");
        let actions: Vec<&str> = notification
            .actions
            .iter()
            .map(|a| a.action.as_str())
            .collect();
        assert_eq!(actions, vec!["open", "close"]);
    }
}
