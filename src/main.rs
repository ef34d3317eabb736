//! speech-listener-daemon: background speech listener
//!
//! Continuously captures finalized speech-recognition results through an
//! external recognition engine, queues them for retrieval, and in auto mode
//! re-points the engine at the language detected on recognized text. The
//! daemon provides:
//! - A listener controller with explicit Stopped/Listening lifecycle
//! - Keyword-heuristic language detection with debounced engine restarts
//! - An IPC server for the caller-facing commands (start/stop listening,
//!   next sentence, language selection, status)
//!
//! The speech-to-text engine itself is an external capability behind the
//! `RecognitionEngine` trait; when none is available the daemon stays up
//! but listening commands are inert.

mod config;
mod engine;
mod events;
mod ipc;
mod language;
mod lifecycle;
mod listener;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::ListenerEvent;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::listener::Controller;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "speech-listener-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, language = %config.default_language, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // Engine -> controller (final results, session ends)
    let (engine_tx, engine_rx) = mpsc::channel(64);
    // IPC server -> controller (commands)
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    // Controller -> IPC subscribers (listener events)
    let (event_tx, _event_rx) = broadcast::channel::<ListenerEvent>(64);

    // Construct the recognition engine. The daemon must stay up without
    // one: listening commands become no-ops and status reports the
    // capability as missing.
    let recognition_engine = match engine::create(config.engine, engine_tx) {
        Ok(engine) => Some(engine),
        Err(e) => {
            error!(
                error = %e,
                "speech recognition is unavailable; the daemon will accept \
                 commands but never produce results"
            );
            None
        }
    };

    // Create the listener controller
    let mut controller = Controller::new(
        recognition_engine,
        config.default_language.clone(),
        config.restart_debounce,
        event_tx.clone(),
    );

    // Create the IPC server
    let server = Server::new(&config.socket_path, cmd_tx, event_tx)?;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the listener controller (processes commands + engine events)
        _ = controller.run(cmd_rx, engine_rx) => {
            info!("listener controller exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!("speech-listener-daemon stopped");

    Ok(())
}
