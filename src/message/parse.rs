use std::str::FromStr;

use crate::error::MessageParseError;

use super::nom_parser::parse_line;
use super::types::Message;

impl Message {
    /// Parse one protocol line.
    ///
    /// This never fails. A malformed line still yields a message; if no
    /// command token is present the command is left empty, which the
    /// classifier reports as [`MessageKind::Unrecognized`](crate::MessageKind::Unrecognized).
    /// Use [`str::parse`] for a strict variant that rejects such lines.
    pub fn parse(line: &str) -> Message {
        let parsed = parse_line(line);

        Message {
            prefix: parsed.prefix.map(str::to_owned),
            command: parsed.command.to_owned(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
            raw: line.trim_end_matches(['\r', '\n']).to_owned(),
        }
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let msg = Message::parse(s);
        if msg.command.is_empty() {
            return Err(MessageParseError::MissingCommand(msg.raw));
        }
        Ok(msg)
    }
}
