//! HTTP/1.1 request parsing and response encoding
//!
//! Pure functions only; the server feeds them bytes it has already read.

use std::collections::HashMap;

use http::{Method, StatusCode};

use crate::error::{HttpServerError, Result};

/// A fully parsed inbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Path component of the request target
    pub path: String,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    /// Headers with lowercased names
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Build a request from a method and a request target such as
    /// `/pprof/profile?seconds=5`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Parsed request line and headers, before the body has been read.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// Request method
    pub method: Method,
    /// Raw request target (path plus optional query string)
    pub target: String,
    /// Headers with lowercased names
    pub headers: HashMap<String, String>,
}

impl RequestHead {
    /// Declared body length; zero when the header is absent.
    pub fn content_length(&self) -> Result<usize> {
        match self.headers.get("content-length") {
            None => Ok(0),
            Some(value) => value.trim().parse::<usize>().map_err(|_| {
                HttpServerError::MalformedRequest(format!("bad content-length: {value}"))
            }),
        }
    }
}

/// Parse the request head (everything before the blank line).
pub fn parse_request_head(head: &str) -> Result<RequestHead> {
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| HttpServerError::MalformedRequest("empty request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| HttpServerError::MalformedRequest("missing method".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| HttpServerError::MalformedRequest("missing request target".to_string()))?;
    let version = parts
        .next()
        .ok_or_else(|| HttpServerError::MalformedRequest("missing HTTP version".to_string()))?;
    if !version.starts_with("HTTP/1.") {
        return Err(HttpServerError::MalformedRequest(format!(
            "unsupported version: {version}"
        )));
    }

    let method = method
        .parse::<Method>()
        .map_err(|_| HttpServerError::MalformedRequest(format!("bad method: {method}")))?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            HttpServerError::MalformedRequest(format!("bad header line: {line}"))
        })?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(RequestHead {
        method,
        target: target.to_string(),
        headers,
    })
}

/// Split a request target into its path and decoded query parameters.
pub fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match target.split_once('?') {
        None => (target.to_string(), HashMap::new()),
        Some((path, query)) => (path.to_string(), parse_query(query)),
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => parameters.insert(name.to_string(), value.to_string()),
            None => parameters.insert(pair.to_string(), String::new()),
        };
    }
    parameters
}

/// Encode a complete response. Every inspector response closes the
/// connection, so `Connection: close` is always set.
pub fn encode_response(status: StatusCode, content_type: &str, body: &[u8]) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        content_type,
        body.len(),
    );

    let mut response = head.into_bytes();
    response.extend_from_slice(body);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_head() {
        let head = parse_request_head(
            "GET /pprof/profile?seconds=5 HTTP/1.1\r\nHost: localhost\r\nAccept: */*",
        )
        .unwrap();

        assert_eq!(head.method, Method::GET);
        assert_eq!(head.target, "/pprof/profile?seconds=5");
        assert_eq!(head.headers.get("host").map(String::as_str), Some("localhost"));
    }

    #[test]
    fn test_parse_request_head_lowercases_header_names() {
        let head =
            parse_request_head("POST /pprof/symbol HTTP/1.1\r\nContent-Length: 11").unwrap();
        assert_eq!(head.content_length().unwrap(), 11);
    }

    #[test]
    fn test_parse_request_head_rejects_garbage() {
        assert!(parse_request_head("").is_err());
        assert!(parse_request_head("GET").is_err());
        assert!(parse_request_head("GET /pprof/heap").is_err());
        assert!(parse_request_head("GET /pprof/heap SPDY/3").is_err());
    }

    #[test]
    fn test_content_length_absent_is_zero() {
        let head = parse_request_head("GET / HTTP/1.1\r\nHost: localhost").unwrap();
        assert_eq!(head.content_length().unwrap(), 0);
    }

    #[test]
    fn test_content_length_non_numeric_is_an_error() {
        let head = parse_request_head("GET / HTTP/1.1\r\nContent-Length: many").unwrap();
        assert!(head.content_length().is_err());
    }

    #[test]
    fn test_split_target_without_query() {
        let (path, query) = split_target("/pprof/cmdline");
        assert_eq!(path, "/pprof/cmdline");
        assert!(query.is_empty());
    }

    #[test]
    fn test_split_target_with_query() {
        let (path, query) = split_target("/pprof/profile?seconds=30&flag");
        assert_eq!(path, "/pprof/profile");
        assert_eq!(query.get("seconds").map(String::as_str), Some("30"));
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_encode_response_shape() {
        let response = encode_response(StatusCode::OK, "text/plain", b"hello");
        let text = String::from_utf8(response).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_request_builder_parses_target() {
        let request = HttpRequest::new(Method::GET, "/pprof/profile?seconds=12");
        assert_eq!(request.path, "/pprof/profile");
        assert_eq!(request.query_param("seconds"), Some("12"));
        assert_eq!(request.query_param("missing"), None);
    }
}
