//! Events module for listener state changes
//!
//! Provides structured event types emitted by the listener controller as it
//! starts, stops, queues sentences, and switches languages.

use serde::{Deserialize, Serialize};

/// Events emitted by the listener controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerEvent {
    /// Listening was turned on
    ListeningStarted {
        /// Language tag the engine was configured with
        language: String,
    },

    /// Listening was turned off
    ListeningStopped,

    /// A finalized utterance was appended to the sentence queue
    SentenceCaptured {
        /// Trimmed transcript text
        text: String,
    },

    /// The heuristic detected a different language on recognized text
    LanguageDetected {
        /// Tag that was active before detection
        previous: String,
        /// Newly detected tag, now active
        language: String,
    },

    /// The engine ended its session on its own and was started again
    SessionRestarted {
        /// Language tag the fresh session was configured with
        language: String,
    },
}

impl std::fmt::Display for ListenerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerEvent::ListeningStarted { language } => {
                write!(f, "LISTENING_STARTED ({})", language)
            }
            ListenerEvent::ListeningStopped => write!(f, "LISTENING_STOPPED"),
            ListenerEvent::SentenceCaptured { text } => {
                write!(f, "SENTENCE_CAPTURED ({} chars)", text.len())
            }
            ListenerEvent::LanguageDetected { previous, language } => {
                write!(f, "LANGUAGE_DETECTED ({} -> {})", previous, language)
            }
            ListenerEvent::SessionRestarted { language } => {
                write!(f, "SESSION_RESTARTED ({})", language)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ListenerEvent::LanguageDetected {
            previous: "en-US".to_string(),
            language: "es-ES".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("language_detected"));
        assert!(json.contains("es-ES"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"listening_stopped"}"#;
        let event: ListenerEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ListenerEvent::ListeningStopped));
    }
}
