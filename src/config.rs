//! Connection configuration.
//!
//! A [`ConnectionConfig`] names the server, the TLS policy and the login
//! credentials for one session. The client takes its own copy at
//! construction, so later edits to the caller's value have no effect.
//!
//! # Example
//!
//! ```
//! use slirc_client::{ConnectionConfig, Credentials, TlsVerification};
//!
//! let config = ConnectionConfig::new(
//!     "irc.example.net",
//!     6697,
//!     Credentials::new("nick", "user", "Real Name").with_password("secret"),
//! )
//! .with_tls(TlsVerification::Strict);
//!
//! assert_eq!(config.address(), "irc.example.net:6697");
//! ```

use std::fmt;

/// Maximum inbound line length accepted by default, in bytes.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// How the server certificate is checked when TLS is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TlsVerification {
    /// Full chain and hostname validation against the platform roots.
    #[default]
    Strict,
    /// Accept any certificate for any hostname.
    ///
    /// **Insecure.** The connection is encrypted but not authenticated, so
    /// anyone on the path can impersonate the server. Only for self-signed
    /// test servers or bouncers on trusted networks.
    AcceptAll,
}

/// Login credentials sent during registration.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credentials {
    pub nickname: String,
    pub username: String,
    /// Server password. When `None` no PASS lines are sent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub password: Option<String>,
    pub realname: String,
}

impl Credentials {
    /// Credentials without a server password.
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            username: username.into(),
            password: None,
            realname: realname.into(),
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("nickname", &self.nickname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("realname", &self.realname)
            .finish()
    }
}

/// Everything needed to open and register one session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    /// Server hostname or IP address. Also used as the TLS server name.
    pub host: String,
    pub port: u16,
    /// Wrap the socket in TLS.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tls: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tls_verification: TlsVerification,
    pub credentials: Credentials,
    /// Send PASS a second time after USER.
    ///
    /// Some bouncers (ZNC among them) ignore the first PASS and only accept
    /// the one that follows USER.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub repeat_password: bool,
    /// Answer server PINGs from the receive loop.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub auto_pong: bool,
    /// Longest inbound line accepted before the session is dropped.
    #[cfg_attr(feature = "serde", serde(default = "default_max_line_len"))]
    pub max_line_len: usize,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_max_line_len() -> usize {
    MAX_IRC_LINE_LEN
}

impl ConnectionConfig {
    /// Plain-text connection with default options.
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port,
            tls: false,
            tls_verification: TlsVerification::Strict,
            credentials,
            repeat_password: true,
            auto_pong: true,
            max_line_len: MAX_IRC_LINE_LEN,
        }
    }

    /// Enable TLS with the given verification mode.
    #[must_use]
    pub fn with_tls(mut self, verification: TlsVerification) -> Self {
        self.tls = true;
        self.tls_verification = verification;
        self
    }

    #[must_use]
    pub fn with_repeat_password(mut self, repeat: bool) -> Self {
        self.repeat_password = repeat;
        self
    }

    #[must_use]
    pub fn with_auto_pong(mut self, enabled: bool) -> Self {
        self.auto_pong = enabled;
        self
    }

    #[must_use]
    pub fn with_max_line_len(mut self, max_len: usize) -> Self {
        self.max_line_len = max_len;
        self
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
