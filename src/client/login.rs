//! Registration sequence written right after the transport comes up.

use crate::config::Credentials;

/// Lines sent to register, in order, without terminators.
///
/// `PASS`, `NICK`, `USER`, then `PASS` again when `repeat_password` is set.
/// Both `PASS` lines are skipped when no password is configured. The realname
/// is always written as a trailing parameter.
pub fn registration_lines(credentials: &Credentials, repeat_password: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    let pass = credentials
        .password
        .as_deref()
        .map(|password| format!("PASS {}", password));

    lines.extend(pass.clone());
    lines.push(format!("NICK {}", credentials.nickname));
    lines.push(format!(
        "USER {} hostname servername :{}",
        credentials.username, credentials.realname
    ));
    if repeat_password {
        lines.extend(pass);
    }
    lines
}

/// Hide the password of a PASS line for logging.
pub(crate) fn redact(line: &str) -> &str {
    if line.starts_with("PASS ") {
        "PASS <redacted>"
    } else {
        line
    }
}
