//! Endpoint handlers
//!
//! The profile handlers park the connection with the session coordinator;
//! everything else answers synchronously from a runtime snapshot and
//! closes the connection itself.

use http::{Method, StatusCode};
use inspect_http::Connection;
use profile_engine::{HeapRuntime, ProfileKind, Symbolizer};

use crate::coordinator::SessionCoordinator;
use crate::validation::parse_profile_seconds;

/// Fixed window for coordinated heap sessions.
pub const HEAP_PROFILE_WINDOW_SECONDS: u64 = 30;

/// Capability string answered to a symbol GET probe.
pub const SYMBOL_CAPABILITY: &str = "num_symbols: 1\n";

/// CPU profile endpoint: validate, then join the CPU session.
pub fn handle_profile(connection: &Connection, coordinator: &SessionCoordinator) {
    if connection.method() != Method::GET {
        connection.error(StatusCode::BAD_REQUEST, "Only accept GET method");
        return;
    }

    let seconds = parse_profile_seconds(connection.query_param("seconds"));
    if seconds < 0 {
        connection.error(StatusCode::BAD_REQUEST, "Invalid profile seconds parameter");
        return;
    }

    coordinator.join(ProfileKind::Cpu, connection.id(), seconds as u64);
}

/// Heap endpoint: immediate sample when sample-mode is on, otherwise a
/// coordinated session with the fixed window.
pub fn handle_heap(
    connection: &Connection,
    coordinator: &SessionCoordinator,
    runtime: &dyn HeapRuntime,
    sample_mode: bool,
) {
    if sample_mode {
        connection.send_text(runtime.sample_text());
        connection.close();
        return;
    }

    coordinator.join(
        ProfileKind::Heap,
        connection.id(),
        HEAP_PROFILE_WINDOW_SECONDS,
    );
}

/// Heap stats endpoint.
pub fn handle_heap_stats(connection: &Connection, runtime: &dyn HeapRuntime) {
    connection.send_text(runtime.stats_text());
    connection.close();
}

/// Heap growth-stacks endpoint.
pub fn handle_growth(connection: &Connection, runtime: &dyn HeapRuntime) {
    connection.send_text(runtime.growth_text());
    connection.close();
}

/// Heap size-class histogram endpoint.
pub fn handle_heap_histogram(connection: &Connection, runtime: &dyn HeapRuntime) {
    let histogram = runtime.histogram();
    let mut output = format!(
        "blocks {}\ntotal {}\n",
        histogram.blocks, histogram.total_bytes
    );
    for (bucket, count) in histogram.buckets.iter().enumerate() {
        output.push_str(&format!("{} {}\n", bucket, count));
    }

    connection.send_text(output);
    connection.close();
}

/// Command-line endpoint: the process argument list, one per line.
pub fn handle_cmdline(connection: &Connection) {
    let mut output = String::new();
    for argument in std::env::args() {
        output.push_str(&argument);
        output.push('\n');
    }

    connection.send_text(output);
    connection.close();
}

/// Symbol endpoint.
///
/// GET answers the fixed capability string. POST treats the body as a
/// `+`-joined list of hex addresses and answers one `address<TAB>name`
/// line per input, substituting `unknown` when an address does not
/// resolve. Anything else is a bad request.
pub fn handle_symbol(connection: &Connection, symbolizer: &dyn Symbolizer) {
    if connection.method() == Method::GET {
        connection.send_text(SYMBOL_CAPABILITY);
        connection.close();
        return;
    }
    if connection.method() != Method::POST {
        connection.error(StatusCode::BAD_REQUEST, "Only accept GET or POST method");
        return;
    }

    let body = String::from_utf8_lossy(connection.body()).into_owned();
    let mut output = String::new();
    for address in body.split('+') {
        output.push_str(address);
        output.push('\t');
        match resolve_address(address, symbolizer) {
            Some(name) => output.push_str(&name),
            None => output.push_str("unknown"),
        }
        output.push('\n');
    }

    connection.send_text(output);
    connection.close();
}

/// Parse one hex address and resolve it. Failure at either step means
/// `unknown` for this address only.
fn resolve_address(address: &str, symbolizer: &dyn Symbolizer) -> Option<String> {
    let trimmed = address.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let address = u64::from_str_radix(digits, 16).ok()?;
    symbolizer.symbolize(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverResolves;

    impl Symbolizer for NeverResolves {
        fn symbolize(&self, _address: u64) -> Option<String> {
            None
        }
    }

    struct AlwaysMain;

    impl Symbolizer for AlwaysMain {
        fn symbolize(&self, _address: u64) -> Option<String> {
            Some("main".to_string())
        }
    }

    #[test]
    fn test_resolve_address_accepts_hex_forms() {
        let symbolizer = AlwaysMain;
        assert_eq!(
            resolve_address("deadbeef", &symbolizer),
            Some("main".to_string())
        );
        assert_eq!(
            resolve_address("0xdeadbeef", &symbolizer),
            Some("main".to_string())
        );
        assert_eq!(
            resolve_address(" 0Xff ", &symbolizer),
            Some("main".to_string())
        );
    }

    #[test]
    fn test_resolve_address_rejects_garbage() {
        let symbolizer = AlwaysMain;
        assert_eq!(resolve_address("", &symbolizer), None);
        assert_eq!(resolve_address("zzz", &symbolizer), None);
    }

    #[test]
    fn test_unresolved_addresses_are_unknown() {
        assert_eq!(resolve_address("deadbeef", &NeverResolves), None);
    }
}
