//! Symbol endpoint compliance

use http::Method;
use inspect_http::{Connection, ConnectionRegistry, HttpRequest, ResponseFrame};
use pprof_endpoints::{handle_symbol, SYMBOL_CAPABILITY};
use tokio::sync::mpsc;

use super::{open_connection, response_body, NeverResolves, ResolvesKnown};

fn open_post(
    registry: &ConnectionRegistry,
    body: &str,
) -> (Connection, mpsc::UnboundedReceiver<ResponseFrame>) {
    let request = HttpRequest::new(Method::POST, "/pprof/symbol").with_body(body);
    let (connection, frames) = Connection::open(request);
    registry.register(&connection);
    (connection, frames)
}

#[test]
fn test_get_answers_capability_string() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/symbol");

    handle_symbol(&connection, &NeverResolves);

    let body = response_body(&mut frames).expect("capability response");
    assert_eq!(body, SYMBOL_CAPABILITY.as_bytes());
}

#[test]
fn test_post_unresolved_batch_is_all_unknown() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_post(&registry, "a+b+c");

    handle_symbol(&connection, &NeverResolves);

    let body = response_body(&mut frames).expect("batch response");
    assert_eq!(body, b"a\tunknown\nb\tunknown\nc\tunknown\n");
}

#[test]
fn test_post_mixed_batch_resolves_per_address() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_post(&registry, "deadbeef+1234");

    handle_symbol(&connection, &ResolvesKnown);

    let body = response_body(&mut frames).expect("batch response");
    assert_eq!(body, b"deadbeef\tknown_function\n1234\tunknown\n");
}

#[test]
fn test_post_empty_body_answers_single_unknown_line() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_post(&registry, "");

    handle_symbol(&connection, &NeverResolves);

    let body = response_body(&mut frames).expect("batch response");
    assert_eq!(body, b"\tunknown\n");
}
