//! Display name validation
//!
//! A display name is asserted once, at connect time, as the entire handshake.
//! The server trusts it as-is, so the only rules are the client-side ones:
//! non-empty after trimming, and not the reserved sender name the server
//! uses for its own announcements.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sender name reserved for server announcements
pub const RESERVED_NAME: &str = "SERVER";

/// Name validation errors
///
/// The display texts are the exact status lines shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is empty after trimming
    #[error("Empty name is not allowed!")]
    Empty,
    /// Name matches the reserved server name
    #[error("The name SERVER is not allowed!")]
    Reserved,
}

/// A validated chat display name
///
/// Immutable once constructed. The match against [`RESERVED_NAME`] is
/// case-sensitive and runs after trimming, so `"server"` is a valid name
/// while `" SERVER "` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate a raw name as entered by the operator
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name == RESERVED_NAME {
            return Err(NameError::Reserved);
        }

        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
