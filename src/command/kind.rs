use std::fmt;

use crate::message::Message;

use super::types::Command;

/// Classification of a message by its command token.
///
/// Classification is total: every message maps to exactly one kind.
/// Commands the grammar knows but this client does not handle specially
/// become [`Unimplemented`](Self::Unimplemented); anything else becomes
/// [`Unrecognized`](Self::Unrecognized).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    Pass,
    Nick,
    User,
    Privmsg,
    Notice,
    Ping,
    Pong,
    Join,
    Part,
    Quit,
    Error,
    /// A three-digit server reply.
    Numeric(u16),
    /// A known command without specialized handling.
    Unimplemented(Command),
    /// Empty or unknown command token.
    Unrecognized,
}

impl MessageKind {
    /// Classify a parsed message.
    pub fn of(message: &Message) -> Self {
        Self::from_command(message.command())
    }

    /// Classify a bare command token (case-sensitive).
    pub fn from_command(token: &str) -> Self {
        if let Some(code) = parse_numeric(token) {
            return Self::Numeric(code);
        }

        match Command::from_token(token) {
            Some(Command::PASS) => Self::Pass,
            Some(Command::NICK) => Self::Nick,
            Some(Command::USER) => Self::User,
            Some(Command::PRIVMSG) => Self::Privmsg,
            Some(Command::NOTICE) => Self::Notice,
            Some(Command::PING) => Self::Ping,
            Some(Command::PONG) => Self::Pong,
            Some(Command::JOIN) => Self::Join,
            Some(Command::PART) => Self::Part,
            Some(Command::QUIT) => Self::Quit,
            Some(Command::ERROR) => Self::Error,
            Some(other) => Self::Unimplemented(other),
            None => Self::Unrecognized,
        }
    }

    /// True for the two fallback kinds.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Unimplemented(_) | Self::Unrecognized)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(code) => write!(f, "{:03}", code),
            Self::Unimplemented(cmd) => write!(f, "unimplemented {}", cmd),
            Self::Unrecognized => f.write_str("unrecognized"),
            other => write!(f, "{:?}", other),
        }
    }
}

fn parse_numeric(token: &str) -> Option<u16> {
    if token.len() == 3 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}
