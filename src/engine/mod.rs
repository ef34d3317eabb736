//! Recognition engine adapter module
//!
//! The speech-to-text engine itself is an external capability. This module
//! defines the contract the daemon requires from one — start a session in a
//! given language, stop it, and report finalized utterances and session-end
//! events over a channel — plus a factory that probes the host platform.

mod stub;

pub use stub::StubEngine;

use tokio::sync::mpsc;
use tracing::warn;

/// Events an engine delivers to the listener controller.
///
/// Channel order is the engine's reported order; the controller preserves it
/// in the sentence queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A finalized utterance the engine will not revise further
    Final { text: String },
    /// The recognition session terminated, deliberately or on its own
    Ended,
    /// The session died with an engine-reported error
    Failed { message: String },
}

/// Contract the controller requires from a recognition engine.
///
/// Implementations receive an [`EngineEvent`] sender at construction and are
/// expected to push events from whatever thread or task drives the real
/// recognizer. The controller owns the single engine instance and guarantees
/// at most one active session at a time.
pub trait RecognitionEngine: Send {
    /// Begin a recognition session configured for `language`.
    fn start(&mut self, language: &str) -> Result<(), EngineError>;

    /// Tear down the current session. Must be safe to call when no session
    /// is active. An `EngineEvent::Ended` still follows asynchronously.
    fn stop(&mut self);
}

/// Errors produced by engine construction and session control.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no speech recognition capability is available on this platform")]
    Unavailable,

    #[error("a recognition session is already running")]
    AlreadyRunning,

    #[error("failed to start recognition session: {0}")]
    SessionStart(String),
}

/// Which engine backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// The host platform's speech service
    System,
    /// Development stub: full session lifecycle, no recognition
    Stub,
}

impl EngineKind {
    /// Parse a backend name from configuration. Unknown names fall back to
    /// `System` with a warning rather than failing startup.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "stub" => Self::Stub,
            "system" => Self::System,
            other => {
                warn!(engine = other, "unknown engine backend, using system");
                Self::System
            }
        }
    }
}

/// Construct the configured engine backend.
///
/// Returns [`EngineError::Unavailable`] when the host has no usable speech
/// capability; the daemon then stays up but permanently inert.
pub fn create(
    kind: EngineKind,
    events: mpsc::Sender<EngineEvent>,
) -> Result<Box<dyn RecognitionEngine>, EngineError> {
    match kind {
        EngineKind::Stub => Ok(Box::new(StubEngine::new(events))),
        // TODO: bind a real platform speech service backend; until one
        // exists the system backend reports the capability as missing.
        EngineKind::System => Err(EngineError::Unavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(EngineKind::from_name("stub"), EngineKind::Stub);
        assert_eq!(EngineKind::from_name(" STUB "), EngineKind::Stub);
        assert_eq!(EngineKind::from_name("system"), EngineKind::System);
        assert_eq!(EngineKind::from_name("whisper?"), EngineKind::System);
    }

    #[test]
    fn test_system_backend_is_unavailable() {
        let (tx, _rx) = mpsc::channel(8);
        assert!(matches!(
            create(EngineKind::System, tx),
            Err(EngineError::Unavailable)
        ));
    }
}
