//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::ListenerEvent;
use crate::listener::StatusSnapshot;

/// Requests from clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Turn listening on
    StartListening,

    /// Turn listening off
    StopListening,

    /// Pop the oldest recognized sentence
    NextSentence,

    /// Report the active language tag
    CurrentLanguage,

    /// Select `auto` or pin an explicit language tag
    SetLanguage { language: String },

    /// Request current daemon status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to listener event notifications
    Subscribe,
}

/// Responses from daemon to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command accepted; no payload
    Ack,

    /// Oldest queued sentence; empty string means none available
    Sentence { text: String },

    /// Active language tag
    Language { language: String },

    /// Current daemon status
    Status(DaemonStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A listener event occurred
    Event(ListenerEvent),
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Whether listening is on
    pub listening: bool,

    /// Active language tag
    pub language: String,

    /// Whether detection drives the active tag
    pub auto_detect: bool,

    /// Sentences currently queued for retrieval
    pub queued_sentences: usize,

    /// Whether a recognition engine could be constructed at startup
    pub engine_available: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl DaemonStatus {
    /// Build the wire status from a controller snapshot plus server-side
    /// fields.
    pub fn from_snapshot(snapshot: StatusSnapshot, uptime_secs: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            listening: snapshot.listening,
            language: snapshot.language,
            auto_detect: snapshot.auto_detect,
            queued_sentences: snapshot.queued_sentences,
            engine_available: snapshot.engine_available,
            uptime_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SetLanguage {
            language: "fr-FR".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("set_language"));
        assert!(json.contains("fr-FR"));
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"type":"next_sentence"}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(req, Request::NextSentence));
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Sentence {
            text: "hello there".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("sentence"));
        assert!(json.contains("hello there"));
    }

    #[test]
    fn test_notification_serialization() {
        let note = Notification::Event(ListenerEvent::ListeningStopped);
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("event"));
        assert!(json.contains("listening_stopped"));
    }
}
