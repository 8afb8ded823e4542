//! Error types for the IRC client core.
//!
//! Parsing and classification never fail past their own boundary; the
//! strict [`FromStr`](std::str::FromStr) path on [`Message`](crate::Message)
//! is the only place a [`MessageParseError`] is produced. Everything else
//! here describes transport, framing and session failures.

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors encountered when strictly parsing a line into a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty (or only a line terminator).
    #[error("empty message")]
    EmptyMessage,

    /// No command token could be found, e.g. a prefix with nothing after it.
    #[error("missing command in line: {0:?}")]
    MissingCommand(String),
}

/// Framing errors raised while splitting the inbound byte stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line grew beyond the configured limit before its terminator arrived.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes buffered for the offending line.
        actual: usize,
        /// The configured maximum.
        limit: usize,
    },
}

/// Failure to establish the transport (TCP connect or TLS handshake).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// TCP connect (including name resolution) failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The configured host is not usable as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// The TLS client configuration could not be built.
    #[cfg(feature = "tokio")]
    #[error("tls configuration error: {0}")]
    TlsConfig(#[from] tokio_rustls::rustls::Error),

    /// TLS handshake failed, including certificate validation errors.
    #[error("tls handshake with {host} failed: {source}")]
    Handshake {
        /// Server name the handshake was performed against.
        host: String,
        /// Underlying error reported by the TLS stream.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The transport could not be established.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// An operation that needs a ready session was attempted without one.
    #[error("not connected")]
    NotConnected,

    /// `connect` was called on a session that is not disconnected.
    #[error("already connected")]
    AlreadyConnected,

    /// The peer closed the connection.
    #[error("stream closed by peer")]
    StreamClosed,

    /// I/O error on an established connection.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error on an established connection.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why a session ended.
///
/// Unlike the error types this is cloneable, so it can live in the session
/// state and be fanned out to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DisconnectReason {
    /// `disconnect` or `quit` was called.
    Requested,
    /// The peer closed the stream.
    StreamClosed,
    /// Transport setup failed during `connect`.
    ConnectFailed(String),
    /// An I/O error ended the session.
    Io(String),
    /// A line exceeded the configured maximum length.
    LineTooLong {
        /// Bytes buffered for the offending line.
        actual: usize,
        /// The configured maximum.
        limit: usize,
    },
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requested => f.write_str("disconnect requested"),
            Self::StreamClosed => f.write_str("stream closed by peer"),
            Self::ConnectFailed(e) => write!(f, "connect failed: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::LineTooLong { actual, limit } => {
                write!(f, "line too long: {actual} bytes (limit {limit})")
            }
        }
    }
}

impl From<&ClientError> for DisconnectReason {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Connection(e) => Self::ConnectFailed(e.to_string()),
            ClientError::StreamClosed | ClientError::NotConnected => Self::StreamClosed,
            ClientError::Protocol(ProtocolError::LineTooLong { actual, limit }) => {
                Self::LineTooLong {
                    actual: *actual,
                    limit: *limit,
                }
            }
            other => Self::Io(other.to_string()),
        }
    }
}
