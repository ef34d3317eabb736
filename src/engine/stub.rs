//! `StubEngine` — placeholder backend with full session lifecycle.
//!
//! Accepts start/stop and emits the `Ended` event a real recognizer would
//! fire after teardown, so the controller's restart and shutdown paths can
//! be exercised end-to-end without a speech service. It never produces
//! transcripts.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{EngineError, EngineEvent, RecognitionEngine};

pub struct StubEngine {
    events: mpsc::Sender<EngineEvent>,
    session_active: bool,
}

impl StubEngine {
    pub fn new(events: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            events,
            session_active: false,
        }
    }
}

impl RecognitionEngine for StubEngine {
    fn start(&mut self, language: &str) -> Result<(), EngineError> {
        if self.session_active {
            return Err(EngineError::AlreadyRunning);
        }
        self.session_active = true;
        debug!(language, "stub session started");
        Ok(())
    }

    fn stop(&mut self) {
        if !self.session_active {
            return;
        }
        self.session_active = false;
        debug!("stub session stopped");

        // Mirror a real recognizer: teardown is followed by an end event.
        if self.events.try_send(EngineEvent::Ended).is_err() {
            warn!("engine event channel full or closed, end event dropped");
        }
    }
}
