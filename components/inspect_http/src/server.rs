//! Inspect HTTP server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::{
    Connection, ConnectionId, ConnectionRegistry, RequestDispatcher, ResponseFrame,
};
use crate::error::{HttpServerError, Result};
use crate::transport::{encode_response, parse_request_head, split_target, HttpRequest};

/// HTTP server fronting the diagnostics endpoints.
pub struct InspectServer {
    /// Server configuration
    config: ServerConfig,

    /// Live connections, shared with the session coordinator
    registry: Arc<ConnectionRegistry>,

    /// Route dispatch, injected by the component layer
    dispatcher: Arc<dyn RequestDispatcher>,
}

impl InspectServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        registry: Arc<ConnectionRegistry>,
        dispatcher: Arc<dyn RequestDispatcher>,
    ) -> Self {
        Self {
            config,
            registry,
            dispatcher,
        }
    }

    /// Bind the configured address and serve until the task is dropped.
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| HttpServerError::Other(anyhow::anyhow!("Invalid address: {}", e)))?;

        let listener = TcpListener::bind(&addr).await?;
        self.run_on(listener).await
    }

    /// Serve on an already-bound listener. Used by the component layer to
    /// support ephemeral ports.
    pub async fn run_on(&self, listener: TcpListener) -> Result<()> {
        info!("inspect server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    debug!("new connection from {}", peer_addr);
                    let registry = Arc::clone(&self.registry);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let config = self.config.clone();

                    tokio::spawn(async move {
                        if let Err(e) =
                            Self::handle_connection(stream, registry, dispatcher, config).await
                        {
                            error!("connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle a single connection: read one request, dispatch it, then
    /// drain response frames to the socket until close.
    async fn handle_connection(
        mut stream: TcpStream,
        registry: Arc<ConnectionRegistry>,
        dispatcher: Arc<dyn RequestDispatcher>,
        config: ServerConfig,
    ) -> Result<()> {
        let request = match timeout(config.read_timeout(), read_request(&mut stream, &config)).await
        {
            Ok(Ok(request)) => request,
            Ok(Err(e)) => {
                let body = format!("Bad request: {e}");
                let response =
                    encode_response(StatusCode::BAD_REQUEST, "text/plain", body.as_bytes());
                stream.write_all(&response).await.ok();
                return Err(e);
            }
            Err(_) => return Err(HttpServerError::ReadTimeout),
        };

        let (connection, mut frames) = Connection::open(request);
        let id = connection.id();
        registry.register(&connection);
        debug!("connection {} registered for {}", id, connection.path());

        dispatcher.dispatch(connection);

        let result = Self::drain_frames(&mut stream, &mut frames, id).await;
        registry.deregister(id);
        stream.shutdown().await.ok();
        debug!("connection {} closed", id);
        result
    }

    /// Write queued response frames until the connection is closed.
    async fn drain_frames(
        stream: &mut TcpStream,
        frames: &mut mpsc::UnboundedReceiver<ResponseFrame>,
        id: ConnectionId,
    ) -> Result<()> {
        let mut responded = false;
        while let Some(frame) = frames.recv().await {
            match frame {
                ResponseFrame::Body { .. } if responded => {
                    warn!("duplicate response frame for connection {} dropped", id);
                }
                ResponseFrame::Body {
                    status,
                    content_type,
                    bytes,
                } => {
                    stream
                        .write_all(&encode_response(status, content_type, &bytes))
                        .await?;
                    responded = true;
                }
                ResponseFrame::Close => break,
            }
        }
        Ok(())
    }
}

/// Read and parse one HTTP request from the socket.
async fn read_request(stream: &mut TcpStream, config: &ServerConfig) -> Result<HttpRequest> {
    let mut buffer = Vec::with_capacity(1024);
    let head_end = loop {
        if let Some(position) = find_head_end(&buffer) {
            break position;
        }
        if buffer.len() > config.max_head_bytes {
            return Err(HttpServerError::RequestTooLarge(
                buffer.len(),
                config.max_head_bytes,
            ));
        }

        let mut chunk = [0u8; 1024];
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(HttpServerError::MalformedRequest(
                "connection closed before request head".to_string(),
            ));
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head_text = std::str::from_utf8(&buffer[..head_end]).map_err(|_| {
        HttpServerError::MalformedRequest("request head is not valid UTF-8".to_string())
    })?;
    let head = parse_request_head(head_text)?;

    let content_length = head.content_length()?;
    if content_length > config.max_body_bytes {
        return Err(HttpServerError::RequestTooLarge(
            content_length,
            config.max_body_bytes,
        ));
    }

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let mut chunk = [0u8; 1024];
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(HttpServerError::MalformedRequest(
                "connection closed before full body".to_string(),
            ));
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    let (path, query) = split_target(&head.target);
    Ok(HttpRequest {
        method: head.method,
        path,
        query,
        headers: head.headers,
        body,
    })
}

/// Offset of the `\r\n\r\n` separating head from body, if present.
fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
