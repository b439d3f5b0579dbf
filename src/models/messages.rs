//! Control channel messages exchanged between pages and the worker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized page → worker messages, tagged by their `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    #[serde(rename = "GET_VERSION")]
    GetVersion,
}

impl ControlMessage {
    /// Validates an untyped message. Unrecognized or malformed shapes yield `None`.
    pub fn parse(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// Reply posted back for `GET_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionReply {
    pub version: String,
    pub cache: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_messages() {
        assert_eq!(
            ControlMessage::parse(&json!({"type": "SKIP_WAITING"})),
            Some(ControlMessage::SkipWaiting)
        );
        assert_eq!(
            ControlMessage::parse(&json!({"type": "GET_VERSION", "extra": 1})),
            Some(ControlMessage::GetVersion)
        );
    }

    #[test]
    fn test_parse_unknown_messages() {
        assert_eq!(ControlMessage::parse(&json!({"type": "CLEAR_ALL"})), None);
        assert_eq!(ControlMessage::parse(&json!({"kind": "GET_VERSION"})), None);
        assert_eq!(ControlMessage::parse(&json!("GET_VERSION")), None);
    }

    #[test]
    fn test_version_reply_serialize() {
        let reply = VersionReply {
            version: "v2.1".to_string(),
            cache: "quantum-chat-v2.1".to_string(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json, json!({"version": "v2.1", "cache": "quantum-chat-v2.1"}));
    }
}
