//! Chat session management
//!
//! A [`Session`] represents one connection to the chat server: the one-shot
//! name handshake, the background receive loop, and the operator send path.
//! State transitions are monotonic per session; a disconnected session is
//! never revived, a new connect creates a fresh session.

use crate::core::name::{DisplayName, NameError};
use crate::core::transport::{TcpConfig, TcpTransport, TransportError, TransportReader, TransportWriter};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Capacity of the session event channel
const EVENT_CAPACITY: usize = 256;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, no connection attempted
    NotConnected,
    /// Connection attempt in progress
    Connecting,
    /// Connected, handshake sent, receive loop running
    Connected,
    /// Terminal state; the transport has been released
    Disconnected,
}

impl SessionState {
    /// Check if the state allows sending
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    /// Check if the state is terminal
    pub fn is_terminal(self) -> bool {
        self == Self::Disconnected
    }
}

/// Session events delivered to the presentation layer
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// One read's worth of decoded server text, delivered verbatim.
    ///
    /// A display unit, not a logical chat message: a single message may
    /// arrive split across several chunks, or several messages concatenated
    /// in one, depending on network timing.
    MessageChunk(String),
    /// Human-readable status line
    Status(String),
    /// State transition
    StateChanged(SessionState),
}

/// Errors from [`Session::connect`]
///
/// The display text is the operator-facing status line for the failure.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Name rejected before any network activity
    #[error(transparent)]
    Name(#[from] NameError),

    /// Dialing or handshake failure; no session is created
    #[error("Connection error: {0}")]
    Connect(#[from] TransportError),
}

/// Active chat session
///
/// Cheap getters run on the caller's thread; `send` and `disconnect` are
/// async because they touch the write half. The receive loop runs as an
/// independent task and is the only long-blocking point in the system.
pub struct Session {
    id: Uuid,
    name: DisplayName,
    state: Arc<RwLock<SessionState>>,
    writer: Arc<Mutex<Box<dyn TransportWriter>>>,
    event_tx: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect to the chat server and register under `raw_name`.
    ///
    /// Validates the name first; a validation failure returns without
    /// touching the network. On a successful dial the validated name is
    /// written as raw UTF-8 bytes with no terminator and no length prefix —
    /// that is the entire handshake, the server does not acknowledge it.
    ///
    /// Returns the session together with an event receiver that already
    /// carries the connect-time events.
    pub async fn connect(
        config: &TcpConfig,
        raw_name: &str,
    ) -> Result<(Self, broadcast::Receiver<SessionEvent>), ConnectError> {
        let name = DisplayName::parse(raw_name)?;

        let transport = TcpTransport::connect(config).await?;
        let (reader, mut writer) = transport.split();
        writer.send(name.as_str().as_bytes()).await?;

        Ok(Self::start(Box::new(reader), Box::new(writer), name))
    }

    /// Wire an already-established transport into a running session.
    pub(crate) fn start(
        reader: Box<dyn TransportReader>,
        writer: Box<dyn TransportWriter>,
        name: DisplayName,
    ) -> (Self, broadcast::Receiver<SessionEvent>) {
        let id = Uuid::new_v4();
        let state = Arc::new(RwLock::new(SessionState::Connecting));
        let writer = Arc::new(Mutex::new(writer));
        let (event_tx, events) = broadcast::channel(EVENT_CAPACITY);
        let cancel = CancellationToken::new();

        *state.write() = SessionState::Connected;
        let _ = event_tx.send(SessionEvent::StateChanged(SessionState::Connected));
        let _ = event_tx.send(SessionEvent::Status(format!("Connected as {name}")));
        tracing::info!(session = %id, name = %name, "connected");

        tokio::spawn(receive_loop(
            id,
            reader,
            state.clone(),
            writer.clone(),
            event_tx.clone(),
            cancel.clone(),
        ));

        let session = Self {
            id,
            name,
            state,
            writer,
            event_tx,
            cancel,
        };
        (session, events)
    }

    /// Get the session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the display name registered with the server
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Check if the session is connected
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Send operator text to the server.
    ///
    /// No-op unless connected. The text is trimmed; text that is empty
    /// after trimming is dropped without any network activity. Otherwise
    /// the UTF-8 bytes go out in exactly one write.
    ///
    /// A failed send is reported as a status event and returned, but it
    /// does not tear the session down: the state stays `Connected` and the
    /// receive loop keeps running. Only the receive path disconnects.
    pub async fn send(&self, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Ok(());
        }

        let message = text.trim();
        if message.is_empty() {
            return Ok(());
        }

        let result = self.writer.lock().await.send(message.as_bytes()).await;
        if let Err(e) = result {
            tracing::warn!(session = %self.id, error = %e, "send failed");
            let _ = self
                .event_tx
                .send(SessionEvent::Status(format!("Failed to send message: {e}")));
            return Err(e);
        }

        tracing::debug!(session = %self.id, bytes = message.len(), "message sent");
        Ok(())
    }

    /// Disconnect from the server.
    ///
    /// Idempotent: only the first call claims the transition, closes the
    /// transport (best-effort, close errors are swallowed) and emits the
    /// `"Disconnected from server"` status. The receive loop observes the
    /// state change and exits without reporting an error.
    pub async fn disconnect(&self) {
        shutdown(self.id, &self.state, &self.writer, &self.event_tx, &self.cancel).await;
    }
}

/// Tear the session down exactly once.
///
/// Shared by `disconnect` and the receive loop's failure path. The state is
/// flipped under the lock before the transport is touched, so a concurrent
/// caller or loop iteration sees `Disconnected` and backs off.
async fn shutdown(
    id: Uuid,
    state: &RwLock<SessionState>,
    writer: &Mutex<Box<dyn TransportWriter>>,
    event_tx: &broadcast::Sender<SessionEvent>,
    cancel: &CancellationToken,
) {
    {
        let mut state = state.write();
        if *state == SessionState::Disconnected {
            return;
        }
        *state = SessionState::Disconnected;
    }

    cancel.cancel();
    writer.lock().await.shutdown().await;

    let _ = event_tx.send(SessionEvent::Status("Disconnected from server".to_string()));
    let _ = event_tx.send(SessionEvent::StateChanged(SessionState::Disconnected));
    tracing::info!(session = %id, "disconnected");
}

/// Background receive loop: one per live session.
///
/// Each iteration performs one blocking read of up to the configured buffer
/// size. Read failures and peer close tear the session down; a read
/// unblocked by a caller-initiated disconnect exits silently.
async fn receive_loop(
    id: Uuid,
    mut reader: Box<dyn TransportReader>,
    state: Arc<RwLock<SessionState>>,
    writer: Arc<Mutex<Box<dyn TransportWriter>>>,
    event_tx: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
) {
    loop {
        if *state.read() != SessionState::Connected {
            break;
        }

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = reader.receive() => result,
        };

        let error = match result {
            Ok(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    tracing::debug!(session = %id, bytes = bytes.len(), "chunk received");
                    let _ = event_tx.send(SessionEvent::MessageChunk(text.to_string()));
                    continue;
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        // An error from our own induced close is the expected shutdown,
        // not a fault: report nothing in that case.
        if *state.read() == SessionState::Connected {
            tracing::warn!(session = %id, error = %error, "receive failed");
            let _ = event_tx.send(SessionEvent::Status(format!("Connection error: {error}")));
            shutdown(id, &state, &writer, &event_tx, &cancel).await;
        }
        break;
    }
}
