//! Connection facade and registry
//!
//! A `Connection` represents one inbound request. Handlers respond through
//! it directly, or record its id with the session coordinator and let the
//! registry deliver later — the id stays valid for as long as the client
//! socket is open, independent of the originating request task.

use std::fmt;

use dashmap::DashMap;
use http::{Method, StatusCode};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::transport::HttpRequest;

/// Unique identifier for an inbound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a new unique connection id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A response fragment queued toward the client socket.
#[derive(Debug)]
pub enum ResponseFrame {
    /// A complete response body. The first body frame wins; the writer
    /// drops any later one.
    Body {
        /// Response status
        status: StatusCode,
        /// Content-Type header value
        content_type: &'static str,
        /// Response body bytes
        bytes: Vec<u8>,
    },
    /// Close the socket.
    Close,
}

/// One inbound request plus the channel its response travels on.
pub struct Connection {
    id: ConnectionId,
    request: HttpRequest,
    frames: mpsc::UnboundedSender<ResponseFrame>,
}

impl Connection {
    /// Create a connection for an inbound request. Returns the connection
    /// handle plus the stream of response frames to drain to the socket.
    pub fn open(request: HttpRequest) -> (Self, mpsc::UnboundedReceiver<ResponseFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::new(),
                request,
                frames: tx,
            },
            rx,
        )
    }

    /// Stable identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.request.query_param(name)
    }

    /// Request body.
    pub fn body(&self) -> &[u8] {
        &self.request.body
    }

    /// Send a 200 response carrying raw artifact bytes.
    pub fn send(&self, bytes: Vec<u8>) {
        self.push(ResponseFrame::Body {
            status: StatusCode::OK,
            content_type: "application/octet-stream",
            bytes,
        });
    }

    /// Send a 200 response carrying plain text.
    pub fn send_text(&self, text: impl Into<String>) {
        self.push(ResponseFrame::Body {
            status: StatusCode::OK,
            content_type: "text/plain",
            bytes: text.into().into_bytes(),
        });
    }

    /// Close the connection.
    pub fn close(&self) {
        self.push(ResponseFrame::Close);
    }

    /// Send an error response and close the connection.
    pub fn error(&self, status: StatusCode, message: &str) {
        self.push(ResponseFrame::Body {
            status,
            content_type: "text/plain",
            bytes: message.as_bytes().to_vec(),
        });
        self.push(ResponseFrame::Close);
    }

    fn push(&self, frame: ResponseFrame) {
        // The writer task may already be gone if the client hung up.
        if self.frames.send(frame).is_err() {
            debug!("response frame dropped; connection {} is gone", self.id);
        }
    }

    pub(crate) fn frame_sender(&self) -> mpsc::UnboundedSender<ResponseFrame> {
        self.frames.clone()
    }
}

/// Deliver to connections by id after the originating request is gone.
pub trait ConnectionFanout: Send + Sync {
    /// Send artifact bytes to the identified connection. Delivery to a
    /// departed connection is logged and dropped, never an error.
    fn send_by_id(&self, id: ConnectionId, bytes: &[u8]);

    /// Close the identified connection.
    fn close_by_id(&self, id: ConnectionId);
}

/// Routes a parsed request to the appropriate endpoint handler.
pub trait RequestDispatcher: Send + Sync {
    /// Handle one inbound connection. Implementations either respond and
    /// close synchronously or park the connection id with the session
    /// coordinator.
    fn dispatch(&self, connection: Connection);
}

/// Registry of live connections, keyed by id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ResponseFrame>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Track a connection until its writer task finishes.
    pub fn register(&self, connection: &Connection) {
        self.connections
            .insert(connection.id(), connection.frame_sender());
    }

    /// Drop a connection from the registry.
    pub fn deregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether any connections are live.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl ConnectionFanout for ConnectionRegistry {
    fn send_by_id(&self, id: ConnectionId, bytes: &[u8]) {
        match self.connections.get(&id) {
            Some(sender) => {
                let frame = ResponseFrame::Body {
                    status: StatusCode::OK,
                    content_type: "application/octet-stream",
                    bytes: bytes.to_vec(),
                };
                if sender.send(frame).is_err() {
                    warn!("delivery to connection {id} failed; writer already gone");
                }
            }
            None => warn!("delivery to unknown connection {id} dropped"),
        }
    }

    fn close_by_id(&self, id: ConnectionId) {
        if let Some(sender) = self.connections.get(&id) {
            let _ = sender.send(ResponseFrame::Close);
        }
    }
}
