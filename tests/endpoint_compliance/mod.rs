//! Shared fakes and helpers for the compliance tests

mod method_tests;
mod snapshot_tests;
mod symbol_tests;
mod validation_tests;

use std::sync::Arc;

use http::Method;
use inspect_http::{
    Connection, ConnectionFanout, ConnectionRegistry, HttpRequest, ResponseFrame,
};
use pprof_endpoints::{CompletionSchedule, SessionCoordinator};
use profile_engine::{
    EngineError, HeapHistogram, HeapRuntime, ProfileEngine, ProfileKind, Symbolizer,
};
use tokio::sync::mpsc;

pub struct StaticEngine;

impl ProfileEngine for StaticEngine {
    fn start(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn flush(&self) {}

    fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn read_artifact(&self) -> Result<Vec<u8>, EngineError> {
        Ok(b"artifact".to_vec())
    }
}

pub struct NeverFires;

impl CompletionSchedule for NeverFires {
    fn arm(&self, _kind: ProfileKind, _after: std::time::Duration) {}
}

pub struct FixedRuntime;

impl HeapRuntime for FixedRuntime {
    fn stats_text(&self) -> String {
        "heap statistics\nlive blocks: 2\n".to_string()
    }

    fn growth_text(&self) -> String {
        "heap growth stacks: 0 sites\n".to_string()
    }

    fn histogram(&self) -> HeapHistogram {
        HeapHistogram {
            blocks: 2,
            total_bytes: 96,
            buckets: vec![0, 1, 1],
        }
    }

    fn sample_text(&self) -> String {
        "heap sample: 96 live bytes in 2 blocks\n".to_string()
    }
}

pub struct NeverResolves;

impl Symbolizer for NeverResolves {
    fn symbolize(&self, _address: u64) -> Option<String> {
        None
    }
}

pub struct ResolvesKnown;

impl Symbolizer for ResolvesKnown {
    fn symbolize(&self, address: u64) -> Option<String> {
        (address == 0xdeadbeef).then(|| "known_function".to_string())
    }
}

/// Coordinator over static engines whose timer never fires on its own;
/// tests drive completion by calling `on_timer_fire` directly.
pub fn coordinator() -> (Arc<ConnectionRegistry>, SessionCoordinator) {
    let registry = Arc::new(ConnectionRegistry::new());
    let coordinator = SessionCoordinator::new(
        Arc::new(StaticEngine),
        Arc::new(StaticEngine),
        Arc::clone(&registry) as Arc<dyn ConnectionFanout>,
        Arc::new(NeverFires),
    );
    (registry, coordinator)
}

/// Open a registered fake connection for the given method and target.
pub fn open_connection(
    registry: &ConnectionRegistry,
    method: Method,
    target: &str,
) -> (Connection, mpsc::UnboundedReceiver<ResponseFrame>) {
    let (connection, frames) = Connection::open(HttpRequest::new(method, target));
    registry.register(&connection);
    (connection, frames)
}

/// Collect whatever frames the handler queued so far.
pub fn collect_frames(
    frames: &mut mpsc::UnboundedReceiver<ResponseFrame>,
) -> Vec<ResponseFrame> {
    let mut collected = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        collected.push(frame);
    }
    collected
}

/// The body of the single response frame, if one was queued.
pub fn response_body(frames: &mut mpsc::UnboundedReceiver<ResponseFrame>) -> Option<Vec<u8>> {
    collect_frames(frames).into_iter().find_map(|frame| match frame {
        ResponseFrame::Body { bytes, .. } => Some(bytes),
        ResponseFrame::Close => None,
    })
}
