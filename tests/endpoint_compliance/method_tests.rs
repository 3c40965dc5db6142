//! Method gating compliance

use http::{Method, StatusCode};
use inspect_http::ResponseFrame;
use pprof_endpoints::{handle_heap, handle_profile, handle_symbol};
use profile_engine::ProfileKind;

use super::{collect_frames, coordinator, open_connection, FixedRuntime, NeverResolves};

#[test]
fn test_profile_rejects_non_get() {
    let (registry, coordinator) = coordinator();

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
        let (connection, mut frames) =
            open_connection(&registry, method.clone(), "/pprof/profile");
        handle_profile(&connection, &coordinator);

        let frames = collect_frames(&mut frames);
        assert_eq!(frames.len(), 2, "{method} should get an error and a close");
        match &frames[0] {
            ResponseFrame::Body { status, bytes, .. } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(bytes.as_slice(), b"Only accept GET method");
            }
            other => panic!("expected body frame, got {other:?}"),
        }
        assert!(matches!(frames[1], ResponseFrame::Close));
    }

    assert_eq!(coordinator.waiter_count(ProfileKind::Cpu), 0);
}

#[test]
fn test_profile_get_joins_without_responding() {
    let (registry, coordinator) = coordinator();
    let (connection, mut frames) =
        open_connection(&registry, Method::GET, "/pprof/profile?seconds=5");

    handle_profile(&connection, &coordinator);

    // Nothing is written until the session completes.
    assert!(collect_frames(&mut frames).is_empty());
    assert_eq!(coordinator.waiter_count(ProfileKind::Cpu), 1);
}

#[test]
fn test_symbol_rejects_other_methods() {
    let registry = inspect_http::ConnectionRegistry::new();
    let (connection, mut frames) = open_connection(&registry, Method::PUT, "/pprof/symbol");
    handle_symbol(&connection, &NeverResolves);

    let frames = collect_frames(&mut frames);
    match &frames[0] {
        ResponseFrame::Body { status, bytes, .. } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(bytes.as_slice(), b"Only accept GET or POST method");
        }
        other => panic!("expected body frame, got {other:?}"),
    }
}

#[test]
fn test_heap_session_mode_joins_regardless_of_method() {
    let (registry, coordinator) = coordinator();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/heap");

    handle_heap(&connection, &coordinator, &FixedRuntime, false);

    assert!(collect_frames(&mut frames).is_empty());
    assert_eq!(coordinator.waiter_count(ProfileKind::Heap), 1);
}

#[test]
fn test_heap_sample_mode_answers_immediately() {
    let (registry, coordinator) = coordinator();
    let (connection, mut frames) = open_connection(&registry, Method::GET, "/pprof/heap");

    handle_heap(&connection, &coordinator, &FixedRuntime, true);

    let frames = collect_frames(&mut frames);
    assert_eq!(frames.len(), 2);
    match &frames[0] {
        ResponseFrame::Body { status, bytes, .. } => {
            assert_eq!(*status, StatusCode::OK);
            assert!(bytes.starts_with(b"heap sample: "));
        }
        other => panic!("expected body frame, got {other:?}"),
    }
    assert_eq!(coordinator.waiter_count(ProfileKind::Heap), 0);
}
