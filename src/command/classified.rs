use std::fmt;

use crate::message::Message;

use super::kind::MessageKind;

/// A parsed message tagged with its [`MessageKind`].
///
/// The full message is always carried, whatever the kind; classification
/// never drops the prefix, command or parameters. Kind-specific views are
/// plain accessors that return `None` for kinds they do not apply to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifiedMessage {
    kind: MessageKind,
    message: Message,
}

impl ClassifiedMessage {
    /// Classify a message. Pure and deterministic; performs no I/O.
    pub fn classify(message: Message) -> Self {
        Self {
            kind: MessageKind::of(&message),
            message,
        }
    }

    /// Parse and classify one line in a single step.
    pub fn from_line(line: &str) -> Self {
        Self::classify(Message::parse(line))
    }

    /// The kind assigned at classification.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The full underlying message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Channel or nickname a PRIVMSG, NOTICE, JOIN or PART is addressed to.
    pub fn target(&self) -> Option<&str> {
        match self.kind {
            MessageKind::Privmsg | MessageKind::Notice | MessageKind::Join | MessageKind::Part => {
                self.message.param(0)
            }
            _ => None,
        }
    }

    /// Human-readable text of a PRIVMSG, NOTICE, PART, QUIT or ERROR.
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            MessageKind::Privmsg | MessageKind::Notice | MessageKind::Part => {
                self.message.param(1)
            }
            MessageKind::Quit | MessageKind::Error => self.message.trailing(),
            _ => None,
        }
    }

    /// Token a PING asks to be echoed, or a PONG echoes back.
    pub fn ping_token(&self) -> Option<&str> {
        match self.kind {
            MessageKind::Ping | MessageKind::Pong => self.message.trailing(),
            _ => None,
        }
    }

    /// The new nickname announced by a NICK message.
    pub fn new_nickname(&self) -> Option<&str> {
        match self.kind {
            MessageKind::Nick => self.message.param(0),
            _ => None,
        }
    }

    /// Reply code of a numeric message.
    pub fn numeric(&self) -> Option<u16> {
        match self.kind {
            MessageKind::Numeric(code) => Some(code),
            _ => None,
        }
    }

    /// Nickname of the sender, if the prefix is a user mask.
    pub fn source_nickname(&self) -> Option<&str> {
        self.message.source().and_then(|p| p.nickname())
    }
}

impl From<Message> for ClassifiedMessage {
    fn from(message: Message) -> Self {
        Self::classify(message)
    }
}

impl fmt::Display for ClassifiedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageKind::Unimplemented(_) => {
                write!(f, "NOT IMPLEMENTED MESSAGE: {}", self.message.raw())
            }
            _ => f.write_str(self.message.raw()),
        }
    }
}
