//! Error types for the inspector component

use thiserror::Error;

/// Errors that can occur in inspector lifecycle operations.
#[derive(Error, Debug)]
pub enum InspectorError {
    /// Server is already running
    #[error("Inspector is already running")]
    AlreadyRunning,

    /// Server is not running
    #[error("Inspector is not running")]
    NotRunning,

    /// HTTP front-end error
    #[error("HTTP server error: {0}")]
    HttpServer(#[from] inspect_http::HttpServerError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for inspector operations.
pub type Result<T> = std::result::Result<T, InspectorError>;
