//! Error types for the inspect HTTP server

use thiserror::Error;

/// Errors that can occur in the HTTP front end.
#[derive(Error, Debug)]
pub enum HttpServerError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request could not be parsed
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Request head or body exceeded the configured limit
    #[error("request size {0} exceeds limit {1}")]
    RequestTooLarge(usize, usize),

    /// Client did not produce a full request in time
    #[error("timed out reading request")]
    ReadTimeout,

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for HTTP front-end operations.
pub type Result<T> = std::result::Result<T, HttpServerError>;
