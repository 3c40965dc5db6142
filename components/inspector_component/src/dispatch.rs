//! Route dispatch over the static table

use std::sync::Arc;

use http::StatusCode;
use inspect_http::{Connection, RequestDispatcher};
use pprof_endpoints::{
    find_route, handle_cmdline, handle_growth, handle_heap, handle_heap_histogram,
    handle_heap_stats, handle_profile, handle_symbol, RouteHandler, SessionCoordinator,
    SnapshotKind,
};
use profile_engine::{HeapRuntime, ProfileKind, Symbolizer};
use tracing::debug;

/// Dispatches parsed requests to the endpoint handlers.
pub(crate) struct EndpointDispatcher {
    pub(crate) coordinator: Arc<SessionCoordinator>,
    pub(crate) runtime: Arc<dyn HeapRuntime>,
    pub(crate) symbolizer: Arc<dyn Symbolizer>,
    pub(crate) heap_sample_mode: bool,
}

impl RequestDispatcher for EndpointDispatcher {
    fn dispatch(&self, connection: Connection) {
        debug!(
            "dispatching {} {} as connection {}",
            connection.method(),
            connection.path(),
            connection.id()
        );

        match find_route(connection.path()) {
            Some(RouteHandler::Profile(ProfileKind::Cpu)) => {
                handle_profile(&connection, &self.coordinator);
            }
            Some(RouteHandler::Profile(ProfileKind::Heap)) => {
                handle_heap(
                    &connection,
                    &self.coordinator,
                    self.runtime.as_ref(),
                    self.heap_sample_mode,
                );
            }
            Some(RouteHandler::Snapshot(kind)) => self.dispatch_snapshot(kind, &connection),
            None => connection.error(StatusCode::NOT_FOUND, "Unknown path"),
        }
    }
}

impl EndpointDispatcher {
    fn dispatch_snapshot(&self, kind: SnapshotKind, connection: &Connection) {
        match kind {
            SnapshotKind::HeapStats => handle_heap_stats(connection, self.runtime.as_ref()),
            SnapshotKind::HeapHistogram => {
                handle_heap_histogram(connection, self.runtime.as_ref())
            }
            SnapshotKind::Growth => handle_growth(connection, self.runtime.as_ref()),
            SnapshotKind::Cmdline => handle_cmdline(connection),
            SnapshotKind::Symbol => handle_symbol(connection, self.symbolizer.as_ref()),
        }
    }
}
