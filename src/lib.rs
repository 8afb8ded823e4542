//! # slirc-client
//!
//! Core of a line-oriented IRC client: message parsing and formatting,
//! classification by command, CR LF framing, TCP/TLS connection setup and a
//! session façade that logs in and fans inbound messages out to subscribers.
//!
//! ## Features
//!
//! - Total line parser: every line yields a [`Message`], nothing is rejected
//! - Classification into [`MessageKind`] without losing any message content
//! - CR LF framing that survives terminators split across reads
//! - Plain TCP or TLS (strict or accept-all verification) via rustls
//! - Tokio session with ordered delivery to any number of subscribers
//!
//! ## Quick Start
//!
//! ### Parsing and classifying lines
//!
//! ```rust
//! use slirc_client::{ClassifiedMessage, Message, MessageKind};
//!
//! let msg = Message::parse(":irc.example.net NOTICE * :*** Looking up your hostname");
//! assert_eq!(msg.prefix(), Some("irc.example.net"));
//! assert_eq!(msg.command(), "NOTICE");
//! assert_eq!(msg.params(), ["*", "*** Looking up your hostname"]);
//!
//! let ping = ClassifiedMessage::from_line("PING :12345");
//! assert_eq!(ping.kind(), MessageKind::Ping);
//! assert_eq!(ping.ping_token(), Some("12345"));
//! ```
//!
//! ### Building messages
//!
//! ```rust
//! use slirc_client::Message;
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! assert_eq!(privmsg.to_string(), "PRIVMSG #rust :Hello, world!");
//! ```
//!
//! With the default `tokio` feature, [`Client`] runs a session; see the
//! [`client`] module for an example.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod prefix;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub mod line;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::command::{ClassifiedMessage, Command, MessageKind};
pub use self::config::{ConnectionConfig, Credentials, TlsVerification, MAX_IRC_LINE_LEN};
pub use self::error::{
    ClientError, ConnectionError, DisconnectReason, MessageParseError, ProtocolError,
};
pub use self::message::Message;
pub use self::prefix::PrefixRef;

#[cfg(feature = "tokio")]
pub use self::client::{Client, SessionEvent, SessionState, Subscription};
#[cfg(feature = "tokio")]
pub use self::line::{Framer, LineCodec};
