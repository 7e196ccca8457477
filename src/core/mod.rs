//! Core module containing the connection lifecycle of chatterm
//!
//! This module provides:
//! - Transport layer for the raw TCP byte stream
//! - Display name validation
//! - Session management: handshake, receive loop, send path

pub mod name;
pub mod session;
pub mod transport;
