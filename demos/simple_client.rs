//! Simple IRC client example
//!
//! Connects to a server, registers, joins a channel once the welcome numeric
//! arrives and prints everything it receives until the session closes.
//!
//! ```text
//! RUST_LOG=slirc_client=debug cargo run --example simple_client -- irc.libera.chat 6697 tls
//! ```

use std::time::Duration;

use anyhow::Context;
use slirc_client::{
    Client, ConnectionConfig, Credentials, MessageKind, SessionEvent, TlsVerification,
};
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let port: u16 = args
        .next()
        .map(|p| p.parse())
        .transpose()
        .context("port must be a number")?
        .unwrap_or(6667);
    let tls = args.next().as_deref() == Some("tls");

    let mut config = ConnectionConfig::new(
        host,
        port,
        Credentials::new("slirc_example", "example", "slirc example client"),
    );
    if tls {
        config = config.with_tls(TlsVerification::Strict);
    }

    let client = Client::new(config);
    let mut events = client.subscribe();

    timeout(Duration::from_secs(30), client.connect())
        .await
        .context("connect timed out")??;

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Message(msg) => {
                println!("← {}", msg);
                if msg.kind() == MessageKind::Numeric(1) {
                    println!("✓ Registration successful!");
                    client.send("JOIN #slirc-test").await?;
                }
                if msg.kind() == MessageKind::Privmsg && msg.text() == Some("!quit") {
                    client.quit(Some("asked to leave")).await?;
                }
            }
            SessionEvent::Closed(reason) => {
                println!("Session closed: {}", reason);
                break;
            }
        }
    }

    Ok(())
}
