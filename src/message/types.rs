use crate::prefix::PrefixRef;

/// One IRC protocol line in structured form.
///
/// A `Message` is built once (by [`Message::parse`] or one of the
/// constructors) and never mutated afterwards. The original line is kept in
/// [`raw`](Self::raw) for diagnostics; it does not take part in equality.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub(super) prefix: Option<String>,
    pub(super) command: String,
    pub(super) params: Vec<String>,
    pub(super) raw: String,
}

impl Message {
    /// Create a message from a command and its parameters.
    ///
    /// Only the last parameter may contain spaces.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::from_parts(
            None,
            command.into(),
            params.into_iter().map(Into::into).collect(),
        )
    }

    /// Return a copy of this message with the given sender prefix.
    #[must_use]
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        Self::from_parts(Some(prefix.into()), self.command, self.params)
    }

    pub(super) fn from_parts(prefix: Option<String>, command: String, params: Vec<String>) -> Self {
        let mut msg = Self {
            prefix,
            command,
            params,
            raw: String::new(),
        };
        msg.raw = msg.to_string();
        msg
    }

    /// `PASS password`
    pub fn pass(password: &str) -> Self {
        Self::new("PASS", [password])
    }

    /// `NICK nickname`
    pub fn nick(nickname: &str) -> Self {
        Self::new("NICK", [nickname])
    }

    /// `USER username hostname servername realname`
    ///
    /// The hostname and servername fields are ignored by servers for client
    /// registration; literal placeholders are sent. Formatting only adds the
    /// trailing colon when the realname needs it; the login sequence always
    /// writes it.
    pub fn user(username: &str, realname: &str) -> Self {
        Self::new("USER", [username, "hostname", "servername", realname])
    }

    /// `PONG token`
    pub fn pong(token: &str) -> Self {
        Self::new("PONG", [token])
    }

    /// `JOIN channel`
    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", [channel])
    }

    /// `PRIVMSG target :text`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", [target, text])
    }

    /// `NOTICE target :text`
    pub fn notice(target: &str, text: &str) -> Self {
        Self::new("NOTICE", [target, text])
    }

    /// `QUIT [:reason]`
    pub fn quit(reason: Option<&str>) -> Self {
        Self::new("QUIT", reason)
    }

    /// Sender prefix without the leading `:`.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Parsed view of the prefix, split into nickname, user and host.
    pub fn source(&self) -> Option<PrefixRef<'_>> {
        self.prefix.as_deref().map(PrefixRef::parse)
    }

    /// Command token, e.g. `PRIVMSG` or `001`. Empty only for malformed lines.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// All parameters in source order, trailing included.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The last parameter, which is the only one allowed to contain spaces.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// The line this message was parsed from (or formatted to).
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.command == other.command && self.params == other.params
    }
}

impl Eq for Message {}
