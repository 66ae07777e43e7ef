//! Connection Manager – owns the control-channel lifecycle.
//!
//! [`ConnectionManager::run`] keeps exactly one logical session open to the
//! backend's WebSocket endpoint:
//!
//! ```text
//! Disconnected → Connecting → Connected → Closed | Errored → Disconnected → …
//! ```
//!
//! Connect failures, mid-session errors and orderly closes are all treated
//! the same way: log, wait the fixed reconnect delay, try again.  There is no
//! retry limit.
//!
//! Inbound frames are awaited one at a time through the [`SessionHandler`],
//! so commands are dispatched strictly in arrival order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use rover_types::RoverError;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{Span, debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default pause between a failed or closed session and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Stream of text payloads produced by one open session.  The stream ends
/// when the peer closes the session; an `Err` item aborts it.
pub type FrameStream = BoxStream<'static, Result<String, RoverError>>;

/// Lifecycle of the control-channel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
    Errored,
}

/// Opens control-channel sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a new session and return its inbound frames.
    async fn connect(&self) -> Result<FrameStream, RoverError>;

    /// Human-readable endpoint, for logs.
    fn endpoint(&self) -> &str;
}

/// Receives the events of an open session.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// Called once per successfully opened session.
    async fn on_open(&self);

    /// Called for every inbound text frame, in arrival order.
    async fn on_frame(&self, payload: &str);
}

// ---------------------------------------------------------------------------
// WebSocket connector
// ---------------------------------------------------------------------------

/// [`Connector`] backed by `tokio-tungstenite`.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// `url` is the full endpoint, e.g. `"ws://localhost:3003/ws/robot/control"`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<FrameStream, RoverError> {
        let (ws_stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| RoverError::Transport(format!("connect {}: {e}", self.url)))?;

        let frames = ws_stream.filter_map(|msg| async move {
            match msg {
                Ok(message) => frame_text(message).map(Ok),
                Err(e) => Some(Err(RoverError::Transport(e.to_string()))),
            }
        });
        Ok(frames.boxed())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Text payload of a WebSocket message, if it carries one.
///
/// Close, ping and pong carry no commands; the stream ends on its own once
/// the close handshake completes.
fn frame_text(message: Message) -> Option<String> {
    match message {
        Message::Text(text) => Some(text.as_str().to_owned()),
        Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(len = bytes.len(), error = %e, "dropping non-UTF-8 binary control frame");
                None
            }
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ConnectionManager
// ---------------------------------------------------------------------------

/// Supervises the control channel forever.
pub struct ConnectionManager<C, H> {
    connector: C,
    handler: Arc<H>,
    reconnect_delay: Duration,
    state_tx: watch::Sender<SessionState>,
    attempts: AtomicU64,
}

impl<C, H> ConnectionManager<C, H>
where
    C: Connector,
    H: SessionHandler,
{
    pub fn new(connector: C, handler: Arc<H>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            connector,
            handler,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            state_tx,
            attempts: AtomicU64::new(0),
        }
    }

    /// Override the fixed reconnect delay (builder-style).
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Watch the session lifecycle.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Number of connect attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Run the connect / receive / reconnect cycle.  Never returns.
    pub async fn run(&self) {
        loop {
            let outcome = self.run_session().await;
            self.state_tx.send_replace(SessionState::Disconnected);
            info!(
                ?outcome,
                delay_secs = self.reconnect_delay.as_secs_f64(),
                "reconnecting to control channel"
            );
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// One connect attempt plus, on success, the receive loop until the
    /// session ends.  Returns the terminal state of the session.
    #[instrument(
        skip(self),
        fields(
            endpoint = %self.connector.endpoint(),
            attempt = tracing::field::Empty,
            session = tracing::field::Empty
        )
    )]
    async fn run_session(&self) -> SessionState {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        Span::current().record("attempt", attempt);
        self.state_tx.send_replace(SessionState::Connecting);
        info!(attempt, endpoint = %self.connector.endpoint(), "connecting to control channel");

        let mut frames = match self.connector.connect().await {
            Ok(frames) => frames,
            Err(e) => {
                error!(attempt, error = %e, "control channel connection failed");
                self.state_tx.send_replace(SessionState::Errored);
                return SessionState::Errored;
            }
        };

        let session = Uuid::new_v4();
        Span::current().record("session", tracing::field::display(session));
        self.state_tx.send_replace(SessionState::Connected);
        info!(%session, "control channel opened");
        self.handler.on_open().await;

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(payload) => {
                    debug!(%session, payload = %payload, "received control frame");
                    self.handler.on_frame(&payload).await;
                }
                Err(e) => {
                    error!(%session, error = %e, "control channel error");
                    self.state_tx.send_replace(SessionState::Errored);
                    return SessionState::Errored;
                }
            }
        }

        info!(%session, "control channel closed");
        self.state_tx.send_replace(SessionState::Closed);
        SessionState::Closed
    }
}
