use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_util::codec::FramedWrite;

use crate::line::LineCodec;

/// Framed sink that terminates every outbound line with CR LF.
pub type LineWriter = FramedWrite<TransportWriteHalf, LineCodec>;

/// An established connection, plain or TLS.
pub enum TransportStream {
    Tcp(TcpStream),
    /// Client-side TLS stream (boxed for size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl TransportStream {
    /// True for a TLS-wrapped stream.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Split into independently owned read and write halves.
    pub fn split(self) -> (TransportReadHalf, TransportWriteHalf) {
        match self {
            Self::Tcp(stream) => {
                let (r, w) = stream.into_split();
                (TransportReadHalf::Tcp(r), TransportWriteHalf::Tcp(w))
            }
            Self::Tls(stream) => {
                let (r, w) = tokio::io::split(*stream);
                (TransportReadHalf::Tls(r), TransportWriteHalf::Tls(w))
            }
        }
    }

    /// Split and wrap the write half in a [`LineWriter`].
    pub fn into_line_parts(self, max_len: usize) -> (TransportReadHalf, LineWriter) {
        let (read, write) = self.split();
        (read, FramedWrite::new(write, LineCodec::with_max_len(max_len)))
    }
}

impl std::fmt::Debug for TransportStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp(s) => f.debug_tuple("Tcp").field(s).finish(),
            Self::Tls(_) => f.write_str("Tls(..)"),
        }
    }
}

/// Owned read half of a [`TransportStream`].
pub enum TransportReadHalf {
    Tcp(OwnedReadHalf),
    Tls(tokio::io::ReadHalf<TlsStream<TcpStream>>),
}

/// Owned write half of a [`TransportStream`].
pub enum TransportWriteHalf {
    Tcp(OwnedWriteHalf),
    Tls(tokio::io::WriteHalf<TlsStream<TcpStream>>),
}

impl AsyncRead for TransportReadHalf {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_read(cx, buf),
            Self::Tls(inner) => Pin::new(inner).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for TransportWriteHalf {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_write(cx, buf),
            Self::Tls(inner) => Pin::new(inner).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_flush(cx),
            Self::Tls(inner) => Pin::new(inner).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_shutdown(cx),
            Self::Tls(inner) => Pin::new(inner).poll_shutdown(cx),
        }
    }
}
