//! TCP transport implementation

use super::{TransportError, TransportReader, TransportWriter};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Default read buffer size in bytes.
///
/// A latency tuning constant, not a message-size limit: server output
/// larger than one buffer is simply delivered across multiple chunks.
pub const DEFAULT_READ_BUFFER: usize = 1024;

/// TCP connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Bytes read per receive call
    pub read_buffer: usize,
}

impl TcpConfig {
    /// Create a new TCP configuration
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// Set the read buffer size
    #[must_use]
    pub fn read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer = bytes;
        self
    }

    /// Server address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 6969)
    }
}

/// An established TCP connection to the chat server
pub struct TcpTransport {
    stream: TcpStream,
    read_buffer: usize,
}

impl TcpTransport {
    /// Open a connection to the configured server.
    ///
    /// No connect timeout: the caller decides how long to wait. Any dial
    /// failure (refused, unreachable, resolution) surfaces as
    /// [`TransportError::ConnectionFailed`] with the cause.
    pub async fn connect(config: &TcpConfig) -> Result<Self, TransportError> {
        let addr = config.address();

        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        // Chat traffic is small and interactive
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            read_buffer: config.read_buffer,
        })
    }

    /// Split into independently owned read and write halves
    pub fn split(self) -> (TcpReader, TcpWriter) {
        let (read, write) = self.stream.into_split();
        (
            TcpReader {
                read,
                buffer: vec![0u8; self.read_buffer],
            },
            TcpWriter { write },
        )
    }
}

/// Read half of a TCP transport
pub struct TcpReader {
    read: OwnedReadHalf,
    buffer: Vec<u8>,
}

#[async_trait]
impl TransportReader for TcpReader {
    async fn receive(&mut self) -> Result<Bytes, TransportError> {
        let n = self.read.read(&mut self.buffer).await?;
        if n == 0 {
            return Err(TransportError::Closed);
        }
        Ok(Bytes::copy_from_slice(&self.buffer[..n]))
    }
}

/// Write half of a TCP transport
pub struct TcpWriter {
    write: OwnedWriteHalf,
}

#[async_trait]
impl TransportWriter for TcpWriter {
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.write.write_all(data).await?;
        self.write.flush().await?;
        Ok(data.len())
    }

    async fn shutdown(&mut self) {
        self.write.shutdown().await.ok();
    }
}
