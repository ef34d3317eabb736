//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use crate::engine::EngineKind;
use crate::language::DEFAULT_LANGUAGE;

/// Restart delay used when none is configured.
const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Language tag used until detection or set-language changes it
    pub default_language: String,

    /// Delay between the stop and start halves of an engine restart
    pub restart_debounce: Duration,

    /// Which recognition engine backend to construct
    pub engine: EngineKind,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("speech-listener");

        let socket_path = match std::env::var("SPEECH_LISTENER_SOCKET") {
            Ok(path) => PathBuf::from(path),
            Err(_) => data_dir.join("daemon.sock"),
        };

        let default_language = std::env::var("SPEECH_LISTENER_LANGUAGE")
            .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());

        let restart_debounce = match std::env::var("SPEECH_LISTENER_DEBOUNCE_MS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "invalid debounce override, using default");
                    Duration::from_millis(DEFAULT_DEBOUNCE_MS)
                }
            },
            Err(_) => Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        };

        let engine = std::env::var("SPEECH_LISTENER_ENGINE")
            .map(|name| EngineKind::from_name(&name))
            .unwrap_or(EngineKind::System);

        Ok(Self {
            socket_path,
            data_dir,
            default_language,
            restart_debounce,
            engine,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
