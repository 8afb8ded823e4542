//! Connection establishment: TCP, optional TLS, and split stream halves.
//!
//! [`connect`] opens the socket, enables TCP keepalive and, when the
//! configuration asks for it, performs the TLS handshake. The resulting
//! [`TransportStream`] is split into a read half owned by the receive loop
//! and a write half wrapped in a [`LineWriter`].

mod stream;
pub mod tls;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::ConnectionError;

pub use self::stream::{LineWriter, TransportReadHalf, TransportStream, TransportWriteHalf};

/// Open a connection to the configured server.
///
/// No timeout is applied here; wrap the call in `tokio::time::timeout` if
/// one is needed.
pub async fn connect(config: &ConnectionConfig) -> Result<TransportStream, ConnectionError> {
    let addr = config.address();
    debug!(%addr, tls = config.tls, "connecting");

    let tcp = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .map_err(|source| ConnectionError::Connect {
            addr: addr.clone(),
            source,
        })?;

    if let Err(e) = enable_keepalive(&tcp) {
        warn!("failed to enable TCP keepalive: {}", e);
    }

    if !config.tls {
        debug!(%addr, "tcp connection established");
        return Ok(TransportStream::Tcp(tcp));
    }

    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|_| ConnectionError::InvalidServerName(config.host.clone()))?;
    let connector = TlsConnector::from(Arc::new(tls::client_config(config.tls_verification)?));

    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| ConnectionError::Handshake {
            host: config.host.clone(),
            source,
        })?;

    debug!(%addr, verification = ?config.tls_verification, "tls handshake complete");
    Ok(TransportStream::Tls(Box::new(stream)))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}
