//! Integration tests for the chat session against a loopback TCP server
//!
//! A `TcpListener` on an ephemeral port stands in for the chat server, so
//! every test exercises the real transport: the raw name handshake, the
//! unframed steady-state protocol, and the disconnect paths.

use chatterm_core::{Session, SessionEvent, SessionState, TcpConfig};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Connect a session to a fresh loopback listener
async fn connect_pair(
    name: &str,
    read_buffer: usize,
) -> (Session, broadcast::Receiver<SessionEvent>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = TcpConfig::new("127.0.0.1", port).read_buffer(read_buffer);

    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let (session, events) = Session::connect(&config, name).await.unwrap();
    let server = accept.await.unwrap();

    (session, events, server)
}

async fn read_chunk(server: &mut TcpStream) -> Vec<u8> {
    let mut buffer = vec![0u8; 1024];
    let n = timeout(Duration::from_secs(2), server.read(&mut buffer))
        .await
        .expect("timed out reading from client")
        .unwrap();
    buffer.truncate(n);
    buffer
}

/// Drain events until the session reaches its terminal state
async fn events_until_disconnected(
    events: &mut broadcast::Receiver<SessionEvent>,
) -> Vec<SessionEvent> {
    let mut collected = Vec::new();
    timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.unwrap();
            let done = matches!(event, SessionEvent::StateChanged(SessionState::Disconnected));
            collected.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("session never reached Disconnected");
    collected
}

fn status_lines(events: &[SessionEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Status(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_handshake_is_the_bare_name() {
    let (session, _events, mut server) = connect_pair("  Alice \n", 1024).await;

    // First bytes on the wire are the trimmed name: no newline, no length
    // prefix, nothing else.
    assert_eq!(read_chunk(&mut server).await, b"Alice");

    // The next write is already chat text
    session.send("hi").await.unwrap();
    assert_eq!(read_chunk(&mut server).await, b"hi");

    session.disconnect().await;
}

#[tokio::test]
async fn test_send_trims_to_a_single_write() {
    let (session, _events, mut server) = connect_pair("Alice", 1024).await;
    read_chunk(&mut server).await; // handshake

    session.send("  hello  ").await.unwrap();
    assert_eq!(read_chunk(&mut server).await, b"hello");

    // Whitespace-only text never reaches the wire: the next bytes the
    // server sees belong to the following send.
    session.send("   ").await.unwrap();
    session.send("next").await.unwrap();
    assert_eq!(read_chunk(&mut server).await, b"next");

    session.disconnect().await;
}

#[tokio::test]
async fn test_inbound_text_is_delivered_verbatim() {
    let (session, mut events, mut server) = connect_pair("Bob", 1024).await;
    read_chunk(&mut server).await;

    server.write_all(b"Bob: hi").await.unwrap();

    let chunk = timeout(Duration::from_secs(2), async {
        loop {
            if let SessionEvent::MessageChunk(text) = events.recv().await.unwrap() {
                break text;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(chunk, "Bob: hi");

    session.disconnect().await;
}

#[tokio::test]
async fn test_large_messages_arrive_across_chunks() {
    let (session, mut events, mut server) = connect_pair("Bob", 4).await;
    read_chunk(&mut server).await;

    server.write_all(b"0123456789").await.unwrap();

    // The 4-byte read buffer is a latency constant, not a size limit:
    // the text arrives split, concatenating back to the original.
    let mut received = String::new();
    timeout(Duration::from_secs(2), async {
        while received.len() < 10 {
            if let SessionEvent::MessageChunk(text) = events.recv().await.unwrap() {
                assert!(text.len() <= 4);
                received.push_str(&text);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(received, "0123456789");

    session.disconnect().await;
}

#[tokio::test]
async fn test_server_close_disconnects_exactly_once() {
    let (session, mut events, mut server) = connect_pair("Alice", 1024).await;
    read_chunk(&mut server).await;

    drop(server);

    let events = events_until_disconnected(&mut events).await;
    let statuses = status_lines(&events);
    assert_eq!(
        statuses,
        vec![
            "Connected as Alice",
            "Connection error: connection closed by server",
            "Disconnected from server",
        ]
    );
    assert_eq!(session.state(), SessionState::Disconnected);

    // Terminal state: a later disconnect is a no-op with no new events
    session.disconnect().await;
    let mut rx = session.subscribe();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_operator_disconnect_is_quiet_and_idempotent() {
    let (session, mut events, mut server) = connect_pair("Alice", 1024).await;
    read_chunk(&mut server).await;

    // The receive loop is blocked in an idle read; disconnect must still
    // take effect promptly.
    session.disconnect().await;
    session.disconnect().await;

    let events = events_until_disconnected(&mut events).await;
    let statuses = status_lines(&events);
    assert_eq!(statuses, vec!["Connected as Alice", "Disconnected from server"]);

    // The server observes the close as EOF
    assert_eq!(read_chunk(&mut server).await, b"");
}

#[tokio::test]
async fn test_send_after_disconnect_stays_local() {
    let (session, _events, mut server) = connect_pair("Alice", 1024).await;
    read_chunk(&mut server).await;

    session.disconnect().await;
    session.send("too late").await.unwrap();

    // Nothing after the close reaches the wire
    assert_eq!(read_chunk(&mut server).await, b"");
}

#[tokio::test]
async fn test_connect_refused_creates_no_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = TcpConfig::new("127.0.0.1", port);
    let err = Session::connect(&config, "Alice").await.unwrap_err();
    assert!(err.to_string().starts_with("Connection error:"));
}
