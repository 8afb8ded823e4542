//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary text to the parser and classifier. Neither may panic,
//! and any single well-formed line the strict parser accepts must survive
//! a format/parse round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{ClassifiedMessage, Message};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let message = Message::parse(&input);
    let classified = ClassifiedMessage::classify(message.clone());
    let _ = classified.to_string();

    // Outbound sanitization must never leave a line break behind.
    let sanitized = slirc_client::LineCodec::sanitize(&input);
    assert!(!sanitized.contains(['\r', '\n']));

    if let Ok(strict) = input.parse::<Message>() {
        // A line break inside the text, or a command that would read back as
        // a prefix, cannot come from one formatted line.
        let single_line = !input.contains(['\r', '\n']);
        if single_line && !strict.command().starts_with(':') {
            assert_eq!(Message::parse(&strict.to_string()), strict);
        }
    }
});
