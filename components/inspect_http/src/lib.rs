//! HTTP server and connection management for the inspector
//!
//! This module provides the minimal HTTP/1.1 front end the diagnostics
//! endpoints sit behind: a tokio accept loop, a parsed-request
//! `Connection` facade with a stable id, and a registry that lets the
//! session coordinator deliver to connections long after the originating
//! request task has moved on.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use inspect_http::{Connection, ConnectionRegistry, InspectServer, RequestDispatcher, ServerConfig};
//!
//! struct EchoDispatcher;
//!
//! impl RequestDispatcher for EchoDispatcher {
//!     fn dispatch(&self, connection: Connection) {
//!         connection.send_text(format!("{}\n", connection.path()));
//!         connection.close();
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ConnectionRegistry::new());
//!     let server = InspectServer::new(ServerConfig::default(), registry, Arc::new(EchoDispatcher));
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod config;
pub mod connection;
pub mod error;
pub mod server;
pub mod transport;

// Re-export main types
pub use config::ServerConfig;
pub use connection::{
    Connection, ConnectionFanout, ConnectionId, ConnectionRegistry, RequestDispatcher,
    ResponseFrame,
};
pub use error::{HttpServerError, Result};
pub use server::InspectServer;
pub use transport::{encode_response, parse_request_head, split_target, HttpRequest, RequestHead};
