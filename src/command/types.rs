//! IRC command tokens.
//!
//! The closed set of command verbs defined by RFC 2812. Numeric replies are
//! not listed here; they are classified generically by
//! [`MessageKind`](super::MessageKind).
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

use std::fmt;

macro_rules! commands {
    ($($(#[$doc:meta])* $name:ident,)*) => {
        /// A command token known to the IRC grammar.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[allow(clippy::upper_case_acronyms)]
        pub enum Command {
            $($(#[$doc])* $name,)*
        }

        impl Command {
            /// Every known command, in declaration order.
            pub const ALL: &'static [Command] = &[$(Command::$name,)*];

            /// The wire token for this command.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Command::$name => stringify!($name),)*
                }
            }

            /// Look up a wire token. Matching is case-sensitive.
            pub fn from_token(token: &str) -> Option<Self> {
                match token {
                    $(stringify!($name) => Some(Command::$name),)*
                    _ => None,
                }
            }
        }
    };
}

commands! {
    /// `ADMIN [target]`
    ADMIN,
    /// `CONNECT target port [remote]`
    CONNECT,
    /// `ERROR message`
    ERROR,
    /// `INFO [target]`
    INFO,
    /// `INVITE nickname channel`
    INVITE,
    /// `JOIN channels [keys]`
    JOIN,
    /// `KICK channels users [comment]`
    KICK,
    /// `KILL nickname comment`
    KILL,
    /// `LINKS [[remote] mask]`
    LINKS,
    /// `LIST [channels] [target]`
    LIST,
    /// `LUSERS [mask] [target]`
    LUSERS,
    /// `MODE target [modes]`
    MODE,
    /// `MOTD [target]`
    MOTD,
    /// `NAMES [channels] [target]`
    NAMES,
    /// `NICK nickname`
    NICK,
    /// `NOTICE target text`
    NOTICE,
    /// `OPER name password`
    OPER,
    /// `PART channels [message]`
    PART,
    /// `PASS password`
    PASS,
    /// `PING server1 [server2]`
    PING,
    /// `PONG server1 [server2]`
    PONG,
    /// `PRIVMSG target text`
    PRIVMSG,
    /// `QUIT [message]`
    QUIT,
    /// `SERVICE nickname reserved distribution type reserved info`
    SERVICE,
    /// `SERVLIST [mask] [type]`
    SERVLIST,
    /// `SQUERY servicename text`
    SQUERY,
    /// `SQUIT server comment`
    SQUIT,
    /// `STATS [query] [target]`
    STATS,
    /// `TIME [target]`
    TIME,
    /// `TOPIC channel [topic]`
    TOPIC,
    /// `TRACE [target]`
    TRACE,
    /// `USER username hostname servername realname`
    USER,
    /// `VERSION [target]`
    VERSION,
    /// `WHO [mask]`
    WHO,
    /// `WHOIS [target] masks`
    WHOIS,
    /// `WHOWAS nicknames [count] [target]`
    WHOWAS,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
