//! Session tests against a loopback TCP server.

use std::time::Duration;

use slirc_client::{
    Client, ClientError, ConnectionConfig, Credentials, DisconnectReason, MessageKind,
    SessionEvent, SessionState, Subscription,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn config(port: u16) -> ConnectionConfig {
    ConnectionConfig::new(
        "127.0.0.1",
        port,
        Credentials::new("n", "u", "R").with_password("p"),
    )
}

struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let (r, w) = stream.into_split();
        Self {
            reader: BufReader::new(r),
            writer: w,
        }
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .unwrap()
            .unwrap();
        line
    }

    async fn read_login(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        for _ in 0..4 {
            lines.push(self.read_line().await);
        }
        lines
    }

    async fn write(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn read_to_end(&mut self) -> String {
        let mut rest = String::new();
        timeout(WAIT, self.reader.read_to_string(&mut rest))
            .await
            .unwrap()
            .unwrap();
        rest
    }
}

async fn next_event(sub: &mut Subscription) -> SessionEvent {
    timeout(WAIT, sub.recv())
        .await
        .expect("event within timeout")
        .expect("client alive")
}

async fn connected(port: u16, listener: &TcpListener) -> (Client, Peer) {
    let client = Client::new(config(port));
    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(listener));
    result.unwrap();
    peer.read_login().await;
    (client, peer)
}

#[tokio::test]
async fn test_login_sequence() {
    let (listener, port) = listener().await;
    let client = Client::new(config(port));
    assert_eq!(client.state(), SessionState::Disconnected { reason: None });

    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(&listener));
    result.unwrap();

    assert_eq!(
        peer.read_login().await,
        [
            "PASS p\r\n",
            "NICK n\r\n",
            "USER u hostname servername :R\r\n",
            "PASS p\r\n"
        ]
    );
    assert_eq!(client.state(), SessionState::Ready);
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_login_without_password_or_repeat() {
    let (listener, port) = listener().await;
    let config = ConnectionConfig::new("127.0.0.1", port, Credentials::new("n", "u", "Real Name"));
    let client = Client::new(config);

    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(&listener));
    result.unwrap();

    assert_eq!(peer.read_line().await, "NICK n\r\n");
    assert_eq!(peer.read_line().await, "USER u hostname servername :Real Name\r\n");

    client.disconnect().await;
    assert_eq!(peer.read_to_end().await, "");
}

#[tokio::test]
async fn test_split_terminator_and_auto_pong() {
    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    let mut events = client.subscribe();

    peer.write(b":irc.example.net NOTICE * :*** Looking up your hostname\r")
        .await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    peer.write(b"\nPING :12345\r\n").await;

    match next_event(&mut events).await {
        SessionEvent::Message(msg) => {
            assert_eq!(msg.kind(), MessageKind::Notice);
            assert_eq!(msg.message().prefix(), Some("irc.example.net"));
            assert_eq!(msg.message().params(), ["*", "*** Looking up your hostname"]);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match next_event(&mut events).await {
        SessionEvent::Message(msg) => {
            assert_eq!(msg.kind(), MessageKind::Ping);
            assert_eq!(msg.ping_token(), Some("12345"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert_eq!(peer.read_line().await, "PONG 12345\r\n");
}

#[tokio::test]
async fn test_subscribers_in_registration_order() {
    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;

    let mut first = client.subscribe();
    let dropped = client.subscribe();
    let mut second = client.subscribe();
    drop(dropped);

    peer.write(b":a!b@c PRIVMSG #rust :one\r\n:a!b@c PRIVMSG #rust :two\r\n")
        .await;

    for sub in [&mut first, &mut second] {
        for expected in ["one", "two"] {
            match next_event(sub).await {
                SessionEvent::Message(msg) => {
                    assert_eq!(msg.kind(), MessageKind::Privmsg);
                    assert_eq!(msg.target(), Some("#rust"));
                    assert_eq!(msg.text(), Some(expected));
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }
}

#[tokio::test]
async fn test_send_requires_ready() {
    let client = Client::new(config(1));
    let err = client.send("PRIVMSG #rust :hi").await.unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));

    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    client.send("JOIN #rust").await.unwrap();
    assert_eq!(peer.read_line().await, "JOIN #rust\r\n");

    client.disconnect().await;
    let err = client.send("PRIVMSG #rust :late").await.unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));

    // Nothing after the JOIN reached the peer.
    assert_eq!(peer.read_to_end().await, "");
}

#[tokio::test]
async fn test_peer_close_ends_session() {
    let (listener, port) = listener().await;
    let (client, peer) = connected(port, &listener).await;
    let mut events = client.subscribe();
    let mut states = client.state_changes();

    drop(peer);

    match next_event(&mut events).await {
        SessionEvent::Closed(reason) => assert_eq!(reason, DisconnectReason::StreamClosed),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        client.state(),
        SessionState::Disconnected {
            reason: Some(DisconnectReason::StreamClosed)
        }
    );
    assert!(states.has_changed().unwrap());
    assert!(states.borrow_and_update().is_disconnected());
}

#[tokio::test]
async fn test_disconnect_unblocks_subscribers() {
    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    let mut events = client.subscribe();

    let waiter = tokio::spawn(async move { next_event(&mut events).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    timeout(WAIT, client.disconnect()).await.unwrap();

    match waiter.await.unwrap() {
        SessionEvent::Closed(reason) => assert_eq!(reason, DisconnectReason::Requested),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(peer.read_to_end().await, "");
    assert_eq!(
        client.state().disconnect_reason(),
        Some(&DisconnectReason::Requested)
    );
}

#[tokio::test]
async fn test_connect_twice_fails() {
    let (listener, port) = listener().await;
    let (client, _peer) = connected(port, &listener).await;

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ClientError::AlreadyConnected));
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_connect_refused() {
    let (listener, port) = listener().await;
    drop(listener);

    let client = Client::new(config(port));
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)));
    assert!(matches!(
        client.state().disconnect_reason(),
        Some(DisconnectReason::ConnectFailed(_))
    ));
}

#[tokio::test]
async fn test_line_too_long_is_fatal() {
    let (listener, port) = listener().await;
    let client = Client::new(config(port).with_max_line_len(16));
    let mut events = client.subscribe();

    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(&listener));
    result.unwrap();
    peer.read_login().await;

    peer.write(&[b'x'; 40]).await;

    match next_event(&mut events).await {
        SessionEvent::Closed(DisconnectReason::LineTooLong { limit, .. }) => assert_eq!(limit, 16),
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_quit_and_reconnect() {
    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    let mut events = client.subscribe();

    client.quit(Some("see you")).await.unwrap();
    assert_eq!(peer.read_line().await, "QUIT :see you\r\n");
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Closed(DisconnectReason::Requested)
    ));

    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(&listener));
    result.unwrap();
    assert_eq!(peer.read_login().await.len(), 4);

    peer.write(b"PING :again\r\n").await;
    match next_event(&mut events).await {
        SessionEvent::Message(msg) => assert_eq!(msg.ping_token(), Some("again")),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_do_not_interleave() {
    const TASKS: usize = 8;
    const LINES: usize = 200;

    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    let padding = "x".repeat(300);

    let expected_padding = padding.clone();
    let reader = tokio::spawn(async move {
        let mut next = [0usize; TASKS];
        for _ in 0..TASKS * LINES {
            let line = peer.read_line().await;
            let body = line
                .strip_prefix("PRIVMSG #c :")
                .and_then(|rest| rest.strip_suffix("\r\n"))
                .unwrap_or_else(|| panic!("mangled line: {:?}", line));

            let mut parts = body.splitn(3, '-');
            let task: usize = parts.next().unwrap().parse().unwrap();
            let index: usize = parts.next().unwrap().parse().unwrap();
            assert_eq!(parts.next(), Some(expected_padding.as_str()));

            // Lines from one sender arrive in the order it sent them.
            assert_eq!(index, next[task]);
            next[task] += 1;
        }
        next
    });

    let mut senders = Vec::new();
    for task in 0..TASKS {
        let client = client.clone();
        let padding = padding.clone();
        senders.push(tokio::spawn(async move {
            for index in 0..LINES {
                client
                    .send(format!("PRIVMSG #c :{}-{}-{}", task, index, padding))
                    .await
                    .unwrap();
            }
        }));
    }
    for sender in senders {
        sender.await.unwrap();
    }

    let counts = reader.await.unwrap();
    assert!(counts.iter().all(|&count| count == LINES), "{:?}", counts);
}

/// Keep sending long lines until a send fails; the peer never reads.
fn flood(client: &Client) -> tokio::task::JoinHandle<ClientError> {
    let client = client.clone();
    tokio::spawn(async move {
        let line = format!("PRIVMSG #c :{}", "x".repeat(8000));
        loop {
            if let Err(err) = client.send(line.clone()).await {
                return err;
            }
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disconnect_fails_blocked_send() {
    let (listener, port) = listener().await;
    let (client, _peer) = connected(port, &listener).await;

    let sender = flood(&client);
    // Long enough for the socket buffers to fill and the sender to block.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!sender.is_finished());

    timeout(WAIT, client.disconnect())
        .await
        .expect("disconnect finishes while a send is blocked");

    let err = timeout(WAIT, sender).await.unwrap().unwrap();
    assert!(matches!(err, ClientError::NotConnected), "{:?}", err);
    assert_eq!(
        client.state().disconnect_reason(),
        Some(&DisconnectReason::Requested)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_inbound_delivery_not_held_up_by_blocked_send() {
    let (listener, port) = listener().await;
    let (client, mut peer) = connected(port, &listener).await;
    let mut events = client.subscribe();

    let sender = flood(&client);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!sender.is_finished());

    // Both PINGs need a PONG that cannot be written yet.
    peer.write(b"PING :1\r\nPING :2\r\nPRIVMSG #c :after\r\n").await;

    for expected in ["1", "2"] {
        match next_event(&mut events).await {
            SessionEvent::Message(msg) => assert_eq!(msg.ping_token(), Some(expected)),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    match next_event(&mut events).await {
        SessionEvent::Message(msg) => assert_eq!(msg.text(), Some("after")),
        other => panic!("unexpected event: {:?}", other),
    }

    client.disconnect().await;
    assert!(matches!(
        timeout(WAIT, sender).await.unwrap().unwrap(),
        ClientError::NotConnected
    ));
}

#[tokio::test]
async fn test_reconnect_after_peer_close() {
    let (listener, port) = listener().await;
    let (client, peer) = connected(port, &listener).await;
    let mut events = client.subscribe();

    drop(peer);
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Closed(DisconnectReason::StreamClosed)
    ));

    // The finished receive loop of the first session is reaped here.
    let (result, mut peer) = tokio::join!(client.connect(), Peer::accept(&listener));
    result.unwrap();
    assert_eq!(peer.read_login().await.len(), 4);
    assert!(client.is_connected());
}
