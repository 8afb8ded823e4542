//! IRC message prefix (source) types.
//!
//! ```text
//! prefix := servername | nickname ['!' user] ['@' host]
//! ```

/// Borrowed view of a message prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixRef<'a> {
    /// The full prefix as it appeared on the wire, without the leading `:`.
    pub raw: &'a str,
    /// Nickname or server name.
    pub nick: &'a str,
    /// Username (ident), if present.
    pub user: Option<&'a str>,
    /// Hostname, if present.
    pub host: Option<&'a str>,
}

impl<'a> PrefixRef<'a> {
    /// Split a prefix string into its parts. Never fails.
    pub fn parse(raw: &'a str) -> Self {
        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, Some(host)),
            None => (raw, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };

        Self {
            raw,
            nick,
            user,
            host,
        }
    }

    /// True if this looks like a server name rather than a user mask.
    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none() && self.nick.contains('.')
    }

    /// The nickname, unless the prefix names a server.
    pub fn nickname(&self) -> Option<&'a str> {
        if self.is_server() {
            None
        } else {
            Some(self.nick)
        }
    }
}
