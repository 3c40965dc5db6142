//! `seconds` parameter compliance through the profile handler

use http::{Method, StatusCode};
use inspect_http::ResponseFrame;
use pprof_endpoints::{handle_profile, parse_profile_seconds};
use profile_engine::ProfileKind;

use super::{collect_frames, coordinator, open_connection};

#[test]
fn test_valid_seconds_joins() {
    let (registry, coordinator) = coordinator();

    for target in [
        "/pprof/profile?seconds=0",
        "/pprof/profile?seconds=30",
        "/pprof/profile?seconds=600",
        "/pprof/profile",
        "/pprof/profile?seconds=",
    ] {
        let (connection, mut frames) = open_connection(&registry, Method::GET, target);
        handle_profile(&connection, &coordinator);
        assert!(
            collect_frames(&mut frames).is_empty(),
            "{target} should join silently"
        );
    }

    assert_eq!(coordinator.waiter_count(ProfileKind::Cpu), 5);
}

#[test]
fn test_invalid_seconds_is_a_bad_request() {
    let (registry, coordinator) = coordinator();

    for target in [
        "/pprof/profile?seconds=601",
        "/pprof/profile?seconds=700",
        "/pprof/profile?seconds=-1",
        "/pprof/profile?seconds=abc",
        "/pprof/profile?seconds=1e3",
    ] {
        let (connection, mut frames) = open_connection(&registry, Method::GET, target);
        handle_profile(&connection, &coordinator);

        let frames = collect_frames(&mut frames);
        assert_eq!(frames.len(), 2, "{target} should get an error and a close");
        match &frames[0] {
            ResponseFrame::Body { status, bytes, .. } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(bytes.as_slice(), b"Invalid profile seconds parameter");
            }
            other => panic!("expected body frame, got {other:?}"),
        }
    }

    assert_eq!(coordinator.waiter_count(ProfileKind::Cpu), 0);
}

#[test]
fn test_validation_matches_handler_behavior() {
    // The pure function and the handler agree on the boundary cases.
    assert_eq!(parse_profile_seconds(Some("600")), 600);
    assert_eq!(parse_profile_seconds(Some("601")), -1);
    assert_eq!(parse_profile_seconds(None), 30);
}
