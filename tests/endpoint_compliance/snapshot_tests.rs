//! Snapshot endpoint response formats

use http::Method;
use pprof_endpoints::{handle_cmdline, handle_growth, handle_heap_histogram, handle_heap_stats};

use super::{open_connection, response_body, FixedRuntime};
use inspect_http::ConnectionRegistry;

#[test]
fn test_heap_stats_passes_runtime_text_through() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/heapstats");

    handle_heap_stats(&connection, &FixedRuntime);

    let body = response_body(&mut frames).expect("stats response");
    assert_eq!(body, b"heap statistics\nlive blocks: 2\n");
}

#[test]
fn test_growth_passes_runtime_text_through() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/growth");

    handle_growth(&connection, &FixedRuntime);

    let body = response_body(&mut frames).expect("growth response");
    assert_eq!(body, b"heap growth stacks: 0 sites\n");
}

#[test]
fn test_histogram_layout() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) =
        open_connection(&registry, Method::GET, "/pprof/heaphistogram");

    handle_heap_histogram(&connection, &FixedRuntime);

    let body = response_body(&mut frames).expect("histogram response");
    let text = String::from_utf8(body).expect("UTF-8 body");
    assert_eq!(text, "blocks 2\ntotal 96\n0 0\n1 1\n2 1\n");
}

#[test]
fn test_cmdline_lists_arguments_one_per_line() {
    let registry = ConnectionRegistry::new();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/cmdline");

    handle_cmdline(&connection);

    let body = response_body(&mut frames).expect("cmdline response");
    let text = String::from_utf8(body).expect("UTF-8 body");
    assert_eq!(text.lines().count(), std::env::args().count());
}
