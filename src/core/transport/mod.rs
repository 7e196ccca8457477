//! Transport layer for the chat connection
//!
//! A transport is a raw bidirectional byte stream to the chat server. The
//! wire protocol is fully unframed: whatever the client writes after the
//! name handshake is chat text, whatever the server writes is pre-formatted
//! display text. There is no length prefix and no delimiter anywhere.
//!
//! The stream is split into a read half and a write half behind narrow
//! traits, so the receive loop and the send path fail independently and the
//! session logic can be exercised against scripted stand-ins.

mod tcp;

pub use tcp::{TcpConfig, TcpTransport, DEFAULT_READ_BUFFER};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection could not be established
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Peer closed the stream (zero-length read)
    #[error("connection closed by server")]
    Closed,

    /// I/O error on an established stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read half of a transport
#[async_trait]
pub trait TransportReader: Send {
    /// Perform one read of at most the configured buffer size.
    ///
    /// Blocks until data arrives. Returns [`TransportError::Closed`] when
    /// the peer closes the stream; never returns an empty chunk.
    async fn receive(&mut self) -> Result<Bytes, TransportError>;
}

/// Write half of a transport
#[async_trait]
pub trait TransportWriter: Send {
    /// Write the full payload in a single send operation
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Close the write half. Best-effort: errors are swallowed.
    async fn shutdown(&mut self);
}
