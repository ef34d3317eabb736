//! Unix domain socket server for IPC
//!
//! Translates wire requests into listener controller commands and streams
//! listener events to subscribed clients. A connection that subscribes is
//! switched into notification-only mode: it stops carrying requests and
//! receives every subsequent event instead.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::events::ListenerEvent;
use crate::language::LanguageMode;
use crate::listener::Command;

use super::protocol::{DaemonStatus, Notification, Request, Response};

/// Frames larger than this disconnect the client.
const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// IPC server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    /// Mailbox of the listener controller
    commands: mpsc::Sender<Command>,
    /// Listener events, re-subscribed per client
    event_tx: broadcast::Sender<ListenerEvent>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`.
    pub fn new(
        socket_path: &Path,
        commands: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<ListenerEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            commands,
            event_tx,
            shutdown_tx,
            start_time: Instant::now(),
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let commands = self.commands.clone();
                    let events = self.event_tx.subscribe();
                    let start_time = self.start_time;
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, commands, events, start_time) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: UnixStream,
        commands: mpsc::Sender<Command>,
        events: broadcast::Receiver<ListenerEvent>,
        start_time: Instant,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_BYTES {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            // Parse request
            let request: Request = match serde_json::from_slice(&msg_buf) {
                Ok(request) => request,
                Err(e) => {
                    debug!(?e, "unparseable request");
                    let response = Response::Error {
                        code: "bad_request".to_string(),
                        message: e.to_string(),
                    };
                    Self::send_message(&mut stream, &response).await?;
                    continue;
                }
            };

            debug!(?request, "received request");

            if matches!(request, Request::Subscribe) {
                Self::send_message(&mut stream, &Response::Subscribed).await?;
                return Self::stream_events(stream, events).await;
            }

            let response = Self::process_request(request, &commands, start_time).await;
            Self::send_message(&mut stream, &response).await?;
        }
    }

    /// Forward listener events to a subscribed client until either side
    /// goes away.
    async fn stream_events(
        mut stream: UnixStream,
        mut events: broadcast::Receiver<ListenerEvent>,
    ) -> Result<()> {
        debug!("client subscribed to notifications");

        loop {
            match events.recv().await {
                Ok(event) => {
                    Self::send_message(&mut stream, &Notification::Event(event)).await?;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request by round-tripping through the controller mailbox
    async fn process_request(
        request: Request,
        commands: &mpsc::Sender<Command>,
        start_time: Instant,
    ) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::StartListening => Self::send_command(commands, Command::Start).await,

            Request::StopListening => Self::send_command(commands, Command::Stop).await,

            Request::SetLanguage { language } => {
                let mode = LanguageMode::parse(&language);
                Self::send_command(commands, Command::SetLanguage { mode }).await
            }

            Request::NextSentence => {
                let (reply, rx) = oneshot::channel();
                Self::query(commands, Command::NextSentence { reply }, rx, |text| {
                    Response::Sentence { text }
                })
                .await
            }

            Request::CurrentLanguage => {
                let (reply, rx) = oneshot::channel();
                Self::query(commands, Command::CurrentLanguage { reply }, rx, |language| {
                    Response::Language { language }
                })
                .await
            }

            Request::GetStatus => {
                let (reply, rx) = oneshot::channel();
                let uptime_secs = start_time.elapsed().as_secs();
                Self::query(commands, Command::Status { reply }, rx, move |snapshot| {
                    Response::Status(DaemonStatus::from_snapshot(snapshot, uptime_secs))
                })
                .await
            }

            // Handled by the connection loop before dispatch
            Request::Subscribe => Response::Subscribed,
        }
    }

    async fn send_command(commands: &mpsc::Sender<Command>, command: Command) -> Response {
        if commands.send(command).await.is_err() {
            return Self::controller_gone();
        }
        Response::Ack
    }

    async fn query<T>(
        commands: &mpsc::Sender<Command>,
        command: Command,
        rx: oneshot::Receiver<T>,
        into_response: impl FnOnce(T) -> Response,
    ) -> Response {
        if commands.send(command).await.is_err() {
            return Self::controller_gone();
        }
        match rx.await {
            Ok(value) => into_response(value),
            Err(_) => Self::controller_gone(),
        }
    }

    fn controller_gone() -> Response {
        Response::Error {
            code: "unavailable".to_string(),
            message: "listener controller is not running".to_string(),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
