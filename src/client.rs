//! Session façade.
//!
//! A [`Client`] owns one logical IRC session at a time. [`Client::connect`]
//! opens the transport, writes the registration lines and starts a receive
//! loop that parses and classifies every inbound line and hands it to each
//! [`Subscription`] in wire order.
//!
//! ```no_run
//! use slirc_client::{Client, ConnectionConfig, Credentials, SessionEvent};
//!
//! # async fn run() -> slirc_client::error::Result<()> {
//! let config = ConnectionConfig::new("irc.example.net", 6667, Credentials::new("n", "u", "R"));
//! let client = Client::new(config);
//! let mut events = client.subscribe();
//!
//! client.connect().await?;
//! client.send("JOIN #rust").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::Message(msg) => println!("{}", msg),
//!         SessionEvent::Closed(reason) => {
//!             println!("closed: {}", reason);
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod login;
mod state;

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use futures_util::SinkExt;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::command::{ClassifiedMessage, MessageKind};
use crate::config::ConnectionConfig;
use crate::error::{ClientError, DisconnectReason, ProtocolError, Result};
use crate::line::Framer;
use crate::message::Message;
use crate::transport::{self, LineWriter, TransportReadHalf};

pub use self::state::{SessionEvent, SessionState, Subscription};

/// Handle to an IRC session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    config: ConnectionConfig,
    state: watch::Sender<SessionState>,
    /// Id of the current (or last) session. Bumped by every connect so a
    /// stale receive loop cannot tear down its successor.
    session: AtomicU64,
    writer: Mutex<Option<(u64, LineWriter)>>,
    subscribers: StdMutex<Vec<mpsc::UnboundedSender<SessionEvent>>>,
    receive_task: StdMutex<Option<JoinHandle<()>>>,
}

impl Client {
    /// Create a disconnected client. The configuration is copied.
    pub fn new(config: ConnectionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                config,
                state,
                session: AtomicU64::new(0),
                writer: Mutex::new(None),
                subscribers: StdMutex::new(Vec::new()),
                receive_task: StdMutex::new(None),
            }),
        }
    }

    /// The configuration this client was created with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Current connectivity state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// True while the session is `Ready`.
    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().is_ready()
    }

    /// Watch state transitions.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Register a new subscriber.
    ///
    /// Subscribers are notified in registration order. A subscriber only
    /// sees lines received after it registered.
    ///
    /// The queue behind each subscription is unbounded: a subscription that
    /// is kept but never drained buffers every inbound line. Drop it to
    /// unsubscribe.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.subscribers).push(tx);
        Subscription::new(rx)
    }

    /// Connect, register and start the receive loop.
    ///
    /// Returns once the login lines are written; it does not wait for the
    /// server's welcome. On failure the state ends in `Disconnected` with
    /// the matching reason.
    pub async fn connect(&self) -> Result<()> {
        // A previous receive loop must be fully gone before a new session
        // begins.
        let previous = lock(&self.inner.receive_task).take();
        if let Some(task) = previous {
            let disconnected = self.inner.state.borrow().is_disconnected();
            if !disconnected {
                *lock(&self.inner.receive_task) = Some(task);
                return Err(ClientError::AlreadyConnected);
            }
            if let Err(e) = task.await {
                warn!("previous receive loop ended abnormally: {}", e);
            }
        }

        let id = self
            .inner
            .begin_session()
            .ok_or(ClientError::AlreadyConnected)?;
        let config = &self.inner.config;
        info!(addr = %config.address(), tls = config.tls, "connecting");

        let stream = match transport::connect(config).await {
            Ok(stream) => stream,
            Err(e) => {
                let err = ClientError::from(e);
                warn!("connect failed: {}", err);
                self.inner.teardown(id, DisconnectReason::from(&err)).await;
                return Err(err);
            }
        };

        let (reader, writer) = stream.into_line_parts(config.max_line_len);
        {
            let mut slot = self.inner.writer.lock().await;
            if self.inner.session.load(Ordering::SeqCst) == id {
                *slot = Some((id, writer));
            }
        }

        if !self
            .inner
            .advance(id, SessionState::Connecting, SessionState::Authenticating)
        {
            self.inner.teardown(id, DisconnectReason::Requested).await;
            return Err(ClientError::NotConnected);
        }

        for line in login::registration_lines(&config.credentials, config.repeat_password) {
            if let Err(err) = self.inner.write_line(line, is_authenticating).await {
                warn!("login failed: {}", err);
                self.inner.teardown(id, DisconnectReason::from(&err)).await;
                return Err(err);
            }
        }

        if !self
            .inner
            .advance(id, SessionState::Authenticating, SessionState::Ready)
        {
            self.inner.teardown(id, DisconnectReason::Requested).await;
            return Err(ClientError::NotConnected);
        }

        let framer = Framer::with_max_len(config.max_line_len);
        let task = tokio::spawn(receive_loop(
            Arc::downgrade(&self.inner),
            id,
            self.inner.state.subscribe(),
            reader,
            framer,
        ));
        *lock(&self.inner.receive_task) = Some(task);

        info!(addr = %config.address(), "session ready");
        Ok(())
    }

    /// Send one raw line. The CR LF terminator is appended.
    ///
    /// Fails with [`ClientError::NotConnected`] unless the session is ready,
    /// without writing anything. An I/O error tears the session down.
    pub async fn send(&self, line: impl Into<String>) -> Result<()> {
        let id = self.inner.session.load(Ordering::SeqCst);
        let result = self.inner.write_line(line.into(), SessionState::is_ready).await;

        if let Err(err @ (ClientError::Io(_) | ClientError::Protocol(_))) = &result {
            warn!("send failed: {}", err);
            self.inner.teardown(id, DisconnectReason::from(err)).await;
        }
        result
    }

    /// Format and send a [`Message`].
    pub async fn send_message(&self, message: &Message) -> Result<()> {
        self.send(message.to_string()).await
    }

    /// Send `QUIT` and disconnect.
    ///
    /// The session is torn down even when the QUIT could not be written;
    /// the write result is returned.
    pub async fn quit(&self, reason: Option<&str>) -> Result<()> {
        let result = self.send_message(&Message::quit(reason)).await;
        self.disconnect().await;
        result
    }

    /// End the session and wait for the receive loop to exit.
    ///
    /// Unblocks pending sends. A no-op when already disconnected.
    pub async fn disconnect(&self) {
        let id = self.inner.session.load(Ordering::SeqCst);
        self.inner.teardown(id, DisconnectReason::Requested).await;

        let task = lock(&self.inner.receive_task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("receive loop ended abnormally: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl Inner {
    /// `Disconnected → Connecting`, allocating a new session id.
    fn begin_session(&self) -> Option<u64> {
        let mut id = None;
        self.state.send_if_modified(|state| {
            if !state.is_disconnected() {
                return false;
            }
            *state = SessionState::Connecting;
            id = Some(self.session.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });
        if id.is_some() {
            debug!(state = %SessionState::Connecting, "session state changed");
        }
        id
    }

    /// Move from `from` to `to`, only if session `id` is still current.
    fn advance(&self, id: u64, from: SessionState, to: SessionState) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if *state != from || self.session.load(Ordering::SeqCst) != id {
                return false;
            }
            *state = to.clone();
            true
        });
        if changed {
            debug!(state = %to, "session state changed");
        }
        changed
    }

    /// End session `id`: record the reason and drop its write half.
    ///
    /// Does nothing to a newer session. Safe to call more than once.
    async fn teardown(&self, id: u64, reason: DisconnectReason) {
        let changed = self.state.send_if_modified(|state| {
            if state.is_disconnected() || self.session.load(Ordering::SeqCst) != id {
                return false;
            }
            *state = SessionState::Disconnected {
                reason: Some(reason.clone()),
            };
            true
        });
        if changed {
            info!(%reason, "session closed");
        }

        let writer = {
            let mut slot = self.writer.lock().await;
            match slot.as_ref() {
                Some((owner, _)) if *owner == id => slot.take(),
                _ => None,
            }
        };
        // Dropping the TCP write half shuts the write direction down.
        drop(writer);
    }

    /// Write one line while `usable` holds for the session state.
    ///
    /// Gives up with `NotConnected` as soon as the state stops being usable,
    /// whether waiting for the lock or for the write itself.
    async fn write_line(&self, line: String, usable: fn(&SessionState) -> bool) -> Result<()> {
        let mut state_rx = self.state.subscribe();
        let usable_at_start = usable(&state_rx.borrow_and_update());
        if !usable_at_start {
            return Err(ClientError::NotConnected);
        }

        let mut slot = tokio::select! {
            slot = self.writer.lock() => slot,
            _ = wait_until(&mut state_rx, |s| !usable(s)) => return Err(ClientError::NotConnected),
        };
        let usable_now = usable(&self.state.borrow());
        let writer = match slot.as_mut() {
            Some((_, writer)) if usable_now => writer,
            _ => return Err(ClientError::NotConnected),
        };

        trace!(line = login::redact(&line), "send");
        tokio::select! {
            res = writer.send(line) => res.map_err(ClientError::from_protocol),
            _ = wait_until(&mut state_rx, |s| !usable(s)) => Err(ClientError::NotConnected),
        }
    }

    /// Parse, classify, fan out to subscribers and answer PINGs.
    ///
    /// The PONG is written from its own task so a send stuck on a full
    /// socket never holds up delivery of inbound lines.
    fn dispatch(self: &Arc<Self>, line: String) {
        let message = Arc::new(ClassifiedMessage::from_line(&line));
        trace!(kind = %message.kind(), line = %line, "recv");

        self.notify(SessionEvent::Message(message.clone()));

        if self.config.auto_pong && message.kind() == MessageKind::Ping {
            let pong = Message::pong(message.ping_token().unwrap_or_default()).to_string();
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = inner.write_line(pong, SessionState::is_ready).await {
                    debug!("failed to answer PING: {}", e);
                }
            });
        }
    }

    fn notify(&self, event: SessionEvent) {
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn closed_reason(&self) -> DisconnectReason {
        self.state
            .borrow()
            .disconnect_reason()
            .cloned()
            .unwrap_or(DisconnectReason::Requested)
    }
}

impl ClientError {
    fn from_protocol(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Io(e),
            other => Self::Protocol(other),
        }
    }
}

fn is_authenticating(state: &SessionState) -> bool {
    matches!(state, SessionState::Authenticating)
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolve once `pred` holds for the watched state, or the sender is gone.
async fn wait_until(rx: &mut watch::Receiver<SessionState>, pred: impl Fn(&SessionState) -> bool) {
    loop {
        let done = pred(&rx.borrow_and_update());
        if done || rx.changed().await.is_err() {
            return;
        }
    }
}

/// Owns the read half for one session.
///
/// Holds only a weak reference to the client so that dropping every
/// [`Client`] handle stops the loop.
async fn receive_loop(
    inner: Weak<Inner>,
    id: u64,
    mut state_rx: watch::Receiver<SessionState>,
    mut reader: TransportReadHalf,
    mut framer: Framer,
) {
    debug!(session = id, "receive loop started");

    let reason = loop {
        let read = tokio::select! {
            _ = wait_until(&mut state_rx, |s| !s.is_ready()) => None,
            read = framer.read_line(&mut reader) => Some(read),
        };

        let Some(client) = inner.upgrade() else {
            debug!(session = id, "client dropped, receive loop exiting");
            return;
        };

        match read {
            None => break client.closed_reason(),
            Some(Ok(Some(line))) => client.dispatch(line),
            Some(Ok(None)) => break DisconnectReason::StreamClosed,
            Some(Err(ProtocolError::Io(e))) if e.kind() == io::ErrorKind::UnexpectedEof => {
                break DisconnectReason::StreamClosed
            }
            Some(Err(e)) => break DisconnectReason::from(&ClientError::from_protocol(e)),
        }
    };

    if let Some(client) = inner.upgrade() {
        client.teardown(id, reason.clone()).await;
        client.notify(SessionEvent::Closed(reason));
    }
    debug!(session = id, "receive loop stopped");
}
