//! Line framing for tokio.
//!
//! [`LineCodec`] splits a byte stream on CR LF and writes CR LF terminated
//! lines. [`Framer`] owns the receive buffer and drives the codec, either
//! from chunks handed to it directly or from any [`AsyncRead`].
//!
//! A terminator split across two reads is handled: the codec resumes its
//! scan one byte before where the previous scan stopped, so a trailing CR
//! is paired with an LF that arrives later.

use std::io;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_IRC_LINE_LEN;
use crate::error::ProtocolError;

const CRLF: &[u8; 2] = b"\r\n";

/// Bytes reserved ahead of each socket read.
const READ_CHUNK: usize = 4096;

/// CR LF line codec.
///
/// Decoded lines have the terminator removed and are decoded as UTF-8,
/// with invalid sequences replaced rather than rejected. Bare CR or bare
/// LF bytes are line content, not boundaries.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for a terminator
    next_index: usize,
    /// Maximum line length, terminator excluded
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_len(MAX_IRC_LINE_LEN)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Maximum accepted line length, terminator excluded.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Cut an outgoing line at its first CR or LF.
    ///
    /// Whatever follows an embedded line break would otherwise reach the
    /// server as a separate command.
    pub fn sanitize(line: &str) -> &str {
        match line.find(['\r', '\n']) {
            Some(pos) => &line[..pos],
            None => line,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        let start = self.next_index.saturating_sub(1).min(src.len());

        if let Some(offset) = src[start..].windows(CRLF.len()).position(|w| w == CRLF) {
            let line = src.split_to(start + offset);
            src.advance(CRLF.len());
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        // No complete line yet - remember where we stopped
        self.next_index = src.len();

        // A line of exactly max_len may still be waiting for its LF.
        if src.len() > self.max_len + 1 {
            return Err(ProtocolError::LineTooLong {
                actual: src.len(),
                limit: self.max_len,
            });
        }

        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = Self::sanitize(&line);
        dst.reserve(line.len() + CRLF.len());
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(CRLF);
        Ok(())
    }
}

/// Receive-side framer: one growable buffer plus a [`LineCodec`].
///
/// The buffer holds at most one partial line between calls. Consumed bytes
/// are split off the front as lines are emitted.
#[derive(Debug, Default)]
pub struct Framer {
    buffer: BytesMut,
    codec: LineCodec,
}

impl Framer {
    /// Framer with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_len(MAX_IRC_LINE_LEN)
    }

    /// Framer rejecting lines longer than `max_len` bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(READ_CHUNK),
            codec: LineCodec::with_max_len(max_len),
        }
    }

    /// Append a chunk of received bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Take the next complete line out of the buffer, if there is one.
    pub fn next_line(&mut self) -> Result<Option<String>, ProtocolError> {
        self.codec.decode(&mut self.buffer)
    }

    /// Append a chunk and iterate over every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.push(chunk);
        Lines {
            framer: self,
            failed: false,
        }
    }

    /// Number of buffered bytes not yet emitted as a line.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Read from `reader` until a complete line is available.
    ///
    /// Returns `Ok(None)` on a clean end of stream. A stream that ends in the
    /// middle of a line is an [`io::ErrorKind::UnexpectedEof`] error.
    ///
    /// Cancel safe: if the future is dropped, no received bytes are lost.
    pub async fn read_line<R>(&mut self, reader: &mut R) -> Result<Option<String>, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(line) = self.next_line()? {
                return Ok(Some(line));
            }

            self.buffer.reserve(READ_CHUNK);
            if reader.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed with incomplete line",
                )));
            }
        }
    }
}

/// Iterator returned by [`Framer::feed`].
///
/// Stops after the first error.
pub struct Lines<'a> {
    framer: &'a mut Framer,
    failed: bool,
}

impl Iterator for Lines<'_> {
    type Item = Result<String, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.framer.next_line().transpose();
        self.failed = matches!(next, Some(Err(_)));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn collect(framer: &mut Framer, chunk: &[u8]) -> Vec<String> {
        framer
            .feed(chunk)
            .collect::<Result<Vec<_>, _>>()
            .expect("no framing error")
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, None);
        assert_eq!(&buf[..], b"PING :");
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut framer = Framer::new();

        assert!(collect(&mut framer, b"PRIVMSG #chan :hi\r").is_empty());
        assert_eq!(framer.buffered(), 18);

        let lines = collect(&mut framer, b"\nPING :x\r\n");
        assert_eq!(lines, vec!["PRIVMSG #chan :hi", "PING :x"]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_empty_lines_are_emitted() {
        let mut framer = Framer::new();
        let lines = collect(&mut framer, b"A\r\n\r\n\r\nB\r\n");
        assert_eq!(lines, vec!["A", "", "", "B"]);
    }

    #[test]
    fn test_bare_cr_and_lf_are_content() {
        let mut framer = Framer::new();
        let lines = collect(&mut framer, b"one\ntwo\rthree\r\n");
        assert_eq!(lines, vec!["one\ntwo\rthree"]);
    }

    #[test]
    fn test_partial_tail_is_retained() {
        let mut framer = Framer::new();
        let lines = collect(&mut framer, b"PING :a\r\nPING :b\r\nPRIV");
        assert_eq!(lines, vec!["PING :a", "PING :b"]);
        assert_eq!(framer.buffered(), 4);

        let lines = collect(&mut framer, b"MSG #c :d\r\n");
        assert_eq!(lines, vec!["PRIVMSG #c :d"]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let stream = b":srv 001 me :Welcome\r\nPING :1\r\n";
        let mut framer = Framer::new();
        let mut lines = Vec::new();
        for byte in stream.iter() {
            lines.extend(collect(&mut framer, std::slice::from_ref(byte)));
        }
        assert_eq!(lines, vec![":srv 001 me :Welcome", "PING :1"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut framer = Framer::new();
        let lines = collect(&mut framer, b"PRIVMSG #c :\xff\xfe ok\r\n");
        assert_eq!(lines, vec!["PRIVMSG #c :\u{fffd}\u{fffd} ok"]);
    }

    #[test]
    fn test_decode_too_long_complete() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\r\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(ProtocolError::LineTooLong { actual: 20, limit: 10 })
        ));
    }

    #[test]
    fn test_decode_too_long_partial() {
        let mut framer = Framer::with_max_len(4);
        let mut lines = framer.feed(b"abcdef");
        assert!(matches!(
            lines.next(),
            Some(Err(ProtocolError::LineTooLong { actual: 6, limit: 4 }))
        ));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_line_at_limit_waits_for_lf() {
        let mut framer = Framer::with_max_len(4);
        assert!(collect(&mut framer, b"abcd\r").is_empty());
        assert_eq!(collect(&mut framer, b"\n"), vec!["abcd"]);
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }

    #[test]
    fn test_encode_truncates_embedded_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode("PRIVMSG #test :hello\r\nQUIT".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #test :hello\r\n");

        assert_eq!(LineCodec::sanitize("a\nb"), "a");
        assert_eq!(LineCodec::sanitize("clean"), "clean");
    }

    #[tokio::test]
    async fn test_read_line_across_writes() {
        let (mut client, mut server) = tokio::io::duplex(64);

        tokio::spawn(async move {
            server.write_all(b"PRIVMSG #chan :hi\r").await.unwrap();
            server.flush().await.unwrap();
            tokio::task::yield_now().await;
            server.write_all(b"\nPING :x\r\n").await.unwrap();
        });

        let mut framer = Framer::new();
        assert_eq!(
            framer.read_line(&mut client).await.unwrap().as_deref(),
            Some("PRIVMSG #chan :hi")
        );
        assert_eq!(
            framer.read_line(&mut client).await.unwrap().as_deref(),
            Some("PING :x")
        );
        // Writer dropped: clean end of stream.
        assert_eq!(framer.read_line(&mut client).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_incomplete_at_eof() {
        let mut reader: &[u8] = b"PING :x\r\nPART";
        let mut framer = Framer::new();

        assert_eq!(
            framer.read_line(&mut reader).await.unwrap().as_deref(),
            Some("PING :x")
        );
        match framer.read_line(&mut reader).await {
            Err(ProtocolError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }
}
