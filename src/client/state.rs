use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use crate::command::ClassifiedMessage;
use crate::error::DisconnectReason;

/// Connectivity state of a [`Client`](crate::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No connection. `reason` is `None` before the first connect.
    Disconnected { reason: Option<DisconnectReason> },
    /// Establishing the transport.
    Connecting,
    /// Transport up, login lines being written.
    Authenticating,
    /// Login sent; the receive loop is running.
    Ready,
}

impl SessionState {
    /// True when lines can be sent.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// True in any `Disconnected` state, whatever the reason.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Why the last session ended, if one has.
    pub fn disconnect_reason(&self) -> Option<&DisconnectReason> {
        match self {
            Self::Disconnected { reason } => reason.as_ref(),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Disconnected { reason: None }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { reason: None } => f.write_str("disconnected"),
            Self::Disconnected {
                reason: Some(reason),
            } => write!(f, "disconnected ({})", reason),
            Self::Connecting => f.write_str("connecting"),
            Self::Authenticating => f.write_str("authenticating"),
            Self::Ready => f.write_str("ready"),
        }
    }
}

/// Delivered to subscribers by the receive loop.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// One inbound line, parsed and classified. Shared between subscribers.
    Message(Arc<ClassifiedMessage>),
    /// The session ended. Last event of a session.
    Closed(DisconnectReason),
}

/// Receiving end of [`Client::subscribe`](crate::Client::subscribe).
///
/// Events arrive in wire order. The subscription outlives individual
/// sessions: after a `Closed` event, a reconnect of the same client delivers
/// to it again. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. `None` once the client itself is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Next inbound message of the current session, or `None` once it closes.
    pub async fn next_message(&mut self) -> Option<Arc<ClassifiedMessage>> {
        match self.rx.recv().await? {
            SessionEvent::Message(msg) => Some(msg),
            SessionEvent::Closed(_) => None,
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
