//! # Chatterm Core Library
//!
//! A terminal chat client for unframed TCP chat servers:
//! - One connection per session, with a one-shot name handshake
//! - Concurrent send/receive over an unframed UTF-8 byte stream
//! - A narrow presentation-facing surface: connect, send, disconnect,
//!   plus status and message-chunk notifications
//!
//! The wire protocol has no message boundaries: inbound chunks are display
//! units, not guaranteed-complete chat messages, and the server's output is
//! presumed pre-formatted. The client performs no parsing or reformatting.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatterm_core::{Session, SessionEvent, TcpConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TcpConfig::default();
//!     let (session, mut events) = Session::connect(&config, "Alice").await?;
//!
//!     session.send("hello everyone").await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             SessionEvent::MessageChunk(text) => print!("{text}"),
//!             SessionEvent::Status(status) => eprintln!("* {status}"),
//!             SessionEvent::StateChanged(_) => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::config::AppConfig;
pub use crate::core::name::{DisplayName, NameError, RESERVED_NAME};
pub use crate::core::session::{ConnectError, Session, SessionEvent, SessionState};
pub use crate::core::transport::{
    TcpConfig, TcpTransport, TransportError, TransportReader, TransportWriter,
    DEFAULT_READ_BUFFER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
