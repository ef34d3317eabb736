//! Core listener controller implementation
//!
//! A single-consumer actor: one task owns all listener state and multiplexes
//! the command mailbox, the engine event channel, and the restart-debounce
//! deadline with `tokio::select!`. Commands and engine callbacks therefore
//! never run concurrently, which is what keeps the stop/restart races simple.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{EngineEvent, RecognitionEngine};
use crate::events::ListenerEvent;
use crate::language::{self, LanguageMode};

/// The two lifecycle states of the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    /// No session wanted; engine end events are deliberate
    Stopped,
    /// A session is wanted; engine end events trigger a restart
    Listening,
}

impl Default for ListeningState {
    fn default() -> Self {
        Self::Stopped
    }
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Stopped => write!(f, "Stopped"),
            ListeningState::Listening => write!(f, "Listening"),
        }
    }
}

/// Commands accepted by the controller mailbox. Queries carry a oneshot
/// reply sender; fire-and-forget commands have none.
#[derive(Debug)]
pub enum Command {
    /// Begin listening (idempotent)
    Start,
    /// Stop listening (idempotent)
    Stop,
    /// Pop the oldest queued sentence; empty string when none
    NextSentence { reply: oneshot::Sender<String> },
    /// Report the active language tag
    CurrentLanguage { reply: oneshot::Sender<String> },
    /// Switch between detection-driven and pinned language selection
    SetLanguage { mode: LanguageMode },
    /// Report a point-in-time status snapshot
    Status { reply: oneshot::Sender<StatusSnapshot> },
}

/// Point-in-time controller state, answered over IPC
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub listening: bool,
    pub language: String,
    pub auto_detect: bool,
    pub queued_sentences: usize,
    pub engine_available: bool,
}

/// The listener controller
pub struct Controller {
    /// Current lifecycle state
    state: ListeningState,
    /// Language selection mode
    mode: LanguageMode,
    /// Tag most recently handed (or about to be handed) to the engine
    active_language: String,
    /// Finalized sentences awaiting retrieval, oldest first
    queue: VecDeque<String>,
    /// The single engine instance; `None` when the capability is missing
    engine: Option<Box<dyn RecognitionEngine>>,
    /// Deadline of a scheduled engine restart, if one is pending
    pending_restart: Option<Instant>,
    /// Delay between the stop and start halves of a restart
    debounce: Duration,
    /// Channel for emitting listener events
    event_tx: broadcast::Sender<ListenerEvent>,
}

impl Controller {
    /// Create a new controller in the Stopped state.
    ///
    /// `engine` is `None` when no recognition capability exists on this
    /// platform; the controller then treats listening commands as no-ops.
    pub fn new(
        engine: Option<Box<dyn RecognitionEngine>>,
        default_language: String,
        debounce: Duration,
        event_tx: broadcast::Sender<ListenerEvent>,
    ) -> Self {
        Self {
            state: ListeningState::Stopped,
            mode: LanguageMode::Auto,
            active_language: default_language,
            queue: VecDeque::new(),
            engine,
            pending_restart: None,
            debounce,
            event_tx,
        }
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> ListeningState {
        self.state
    }

    /// Run the controller, processing commands and engine events until the
    /// command channel closes.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<Command>,
        mut engine_events: mpsc::Receiver<EngineEvent>,
    ) {
        info!(language = %self.active_language, "listener controller started");
        let mut engine_closed = false;

        loop {
            let restart_at = self.pending_restart;
            tokio::select! {
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd);
                }
                event = engine_events.recv(), if !engine_closed => {
                    match event {
                        Some(event) => self.handle_engine_event(event),
                        None => {
                            warn!("engine event channel closed");
                            engine_closed = true;
                        }
                    }
                }
                _ = tokio::time::sleep_until(restart_at.unwrap_or_else(Instant::now)),
                    if restart_at.is_some() =>
                {
                    self.finish_restart();
                }
            }
        }

        info!("listener controller stopped");
    }

    /// Dispatch a mailbox command
    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start => self.start_listening(),
            Command::Stop => self.stop_listening(),
            Command::NextSentence { reply } => {
                let _ = reply.send(self.next_sentence());
            }
            Command::CurrentLanguage { reply } => {
                let _ = reply.send(self.active_language.clone());
            }
            Command::SetLanguage { mode } => self.set_language(mode),
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    /// Dispatch an engine event
    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Final { text } => self.handle_final_result(&text),
            EngineEvent::Ended => self.handle_session_end(),
            EngineEvent::Failed { message } => {
                warn!(%message, "engine session failed");
                // Retried exactly like a normal session end; a permanently
                // failing engine is retried on every failure event.
                self.handle_session_end();
            }
        }
    }

    fn start_listening(&mut self) {
        if self.state == ListeningState::Listening {
            debug!("already listening, start ignored");
            return;
        }
        if self.engine.is_none() {
            warn!("start ignored: no recognition engine available");
            return;
        }

        // A fresh session discards the stale backlog.
        self.queue.clear();
        self.pending_restart = None;
        self.state = ListeningState::Listening;
        self.start_engine();

        info!(language = %self.active_language, "listening started");
        self.emit(ListenerEvent::ListeningStarted {
            language: self.active_language.clone(),
        });
    }

    fn stop_listening(&mut self) {
        if self.state == ListeningState::Stopped {
            debug!("not listening, stop ignored");
            return;
        }

        // Stopped must be recorded before the engine stop: the trailing
        // Ended event has to read as deliberate, not as a session loss.
        self.state = ListeningState::Stopped;
        self.pending_restart = None;
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }

        info!("listening stopped");
        self.emit(ListenerEvent::ListeningStopped);
    }

    fn next_sentence(&mut self) -> String {
        self.queue.pop_front().unwrap_or_default()
    }

    fn set_language(&mut self, mode: LanguageMode) {
        match &mode {
            LanguageMode::Auto => {
                info!(language = %self.active_language, "language detection enabled");
            }
            LanguageMode::Fixed(tag) => {
                info!(language = %tag, "language pinned");
                self.active_language = tag.clone();
            }
        }
        self.mode = mode;

        if self.state == ListeningState::Listening {
            self.schedule_restart();
        }
    }

    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            listening: self.state == ListeningState::Listening,
            language: self.active_language.clone(),
            auto_detect: self.mode.is_auto(),
            queued_sentences: self.queue.len(),
            engine_available: self.engine.is_some(),
        }
    }

    /// Queue a finalized utterance and, in auto mode, re-derive the active
    /// language from it.
    fn handle_final_result(&mut self, text: &str) {
        let trimmed = text.trim();
        // Queued even when Stopped or mid-restart: results may trail in
        // from a session that is still tearing down, and none are dropped.
        self.queue.push_back(trimmed.to_string());
        debug!(queued = self.queue.len(), "final result queued");
        self.emit(ListenerEvent::SentenceCaptured {
            text: trimmed.to_string(),
        });

        if !self.mode.is_auto() {
            return;
        }

        let detected = language::detect(trimmed, &self.active_language);
        if detected == self.active_language {
            return;
        }

        let previous = std::mem::replace(&mut self.active_language, detected.clone());
        info!(from = %previous, to = %detected, "language detected");
        self.emit(ListenerEvent::LanguageDetected {
            previous,
            language: detected,
        });

        if self.state == ListeningState::Listening {
            self.schedule_restart();
        }
    }

    /// React to the engine's session terminating, for any reason.
    fn handle_session_end(&mut self) {
        if self.state == ListeningState::Stopped {
            debug!("session ended after deliberate stop");
            return;
        }
        if self.pending_restart.is_some() {
            // This end belongs to the stop half of a scheduled restart;
            // the debounce deadline owns the start half.
            debug!("session ended ahead of a scheduled restart");
            return;
        }

        // Continuous-mode engines end sessions on their own periodically.
        // Starting again immediately keeps listening seamless.
        info!(language = %self.active_language, "session ended on its own, resuming");
        self.start_engine();
        self.emit(ListenerEvent::SessionRestarted {
            language: self.active_language.clone(),
        });
    }

    /// Stop the engine now and arm the debounced start.
    ///
    /// Restarting a recognizer before its previous session has finished
    /// tearing down is unreliable on real engines, hence the delay.
    fn schedule_restart(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        self.pending_restart = Some(Instant::now() + self.debounce);
        debug!(
            delay_ms = self.debounce.as_millis() as u64,
            "engine restart scheduled"
        );
    }

    /// Fire a due restart. Start and Stop both clear the deadline, so by the
    /// time this runs a stale restart can only be one that raced the caller's
    /// stop; the state check drops it.
    fn finish_restart(&mut self) {
        self.pending_restart = None;
        if self.state != ListeningState::Listening {
            debug!("pending restart dropped, no longer listening");
            return;
        }

        info!(language = %self.active_language, "restarting engine");
        self.start_engine();
    }

    fn start_engine(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.start(&self.active_language) {
                warn!(error = %e, "engine start failed");
            }
        }
    }

    fn emit(&self, event: ListenerEvent) {
        let _ = self.event_tx.send(event);
    }
}
