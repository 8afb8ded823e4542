//! Fuzz target for CR LF framing
//!
//! The first byte picks a chunk size; the rest is fed to a framer in chunks
//! of that size and must frame the same as when fed in one piece.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::Framer;

fuzz_target!(|data: &[u8]| {
    let Some((&size, stream)) = data.split_first() else {
        return;
    };
    let size = usize::from(size).max(1);

    let mut whole = Framer::with_max_len(256);
    let expected: Vec<_> = whole.feed(stream).map(|r| r.map_err(|e| e.to_string())).collect();

    let mut chunked = Framer::with_max_len(256);
    let mut actual = Vec::new();
    for chunk in stream.chunks(size) {
        actual.extend(chunked.feed(chunk).map(|r| r.map_err(|e| e.to_string())));
        if actual.last().map_or(false, Result::is_err) {
            break;
        }
    }

    if expected.iter().all(Result::is_ok) && actual.iter().all(Result::is_ok) {
        assert_eq!(expected, actual);
    }
});
