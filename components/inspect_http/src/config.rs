//! Server configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the inspect HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind to
    pub port: u16,

    /// Bind address (default 127.0.0.1 for localhost only)
    pub bind_address: String,

    /// Maximum accepted request-head size in bytes
    pub max_head_bytes: usize,

    /// Maximum accepted request-body size in bytes
    pub max_body_bytes: usize,

    /// Time allowed for a client to deliver its full request, in
    /// milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9280,
            bind_address: "127.0.0.1".to_string(),
            max_head_bytes: 16 * 1024,
            max_body_bytes: 1024 * 1024,
            read_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration for the given port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, address: String) -> Self {
        self.bind_address = address;
        self
    }

    /// Set the maximum request-head size.
    pub fn with_max_head_bytes(mut self, bytes: usize) -> Self {
        self.max_head_bytes = bytes;
        self
    }

    /// Set the maximum request-body size.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Set the request read timeout in milliseconds.
    pub fn with_read_timeout_ms(mut self, millis: u64) -> Self {
        self.read_timeout_ms = millis;
        self
    }

    /// Request read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
