//! Application settings

use crate::core::transport::{TcpConfig, DEFAULT_READ_BUFFER};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
///
/// Host and port are configuration values, not protocol constants; the
/// defaults match the chat server's development setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat server host
    pub host: String,
    /// Chat server port
    pub port: u16,
    /// Bytes read per receive call
    pub read_buffer: usize,
    /// Preferred display name, if any
    pub name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6969,
            read_buffer: DEFAULT_READ_BUFFER,
            name: None,
        }
    }
}

impl AppConfig {
    /// Load config from a file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the transport configuration for these settings
    pub fn tcp_config(&self) -> TcpConfig {
        TcpConfig::new(&self.host, self.port).read_buffer(self.read_buffer)
    }
}
