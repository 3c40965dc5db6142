//! Static route table
//!
//! Paths map to handler descriptors typed by the capability the handler
//! needs: snapshot handlers touch only the connection plus a runtime
//! collaborator, profile handlers also need the session coordinator.

use profile_engine::ProfileKind;

/// One-shot endpoints with no session semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Fixed-layout heap stats block
    HeapStats,
    /// Heap size-class histogram
    HeapHistogram,
    /// Heap growth stacks
    Growth,
    /// Process argument list
    Cmdline,
    /// Symbol capability probe / batch resolution
    Symbol,
}

/// Handler descriptor, typed by required capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHandler {
    /// Joins the session for the given profiling kind.
    Profile(ProfileKind),
    /// Answers synchronously from a runtime snapshot.
    Snapshot(SnapshotKind),
}

/// A path bound to its handler descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// Exact request path
    pub path: &'static str,
    /// Handler descriptor
    pub handler: RouteHandler,
}

/// Every route the inspector serves.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/pprof/profile",
        handler: RouteHandler::Profile(ProfileKind::Cpu),
    },
    Route {
        path: "/pprof/heap",
        handler: RouteHandler::Profile(ProfileKind::Heap),
    },
    Route {
        path: "/pprof/heapstats",
        handler: RouteHandler::Snapshot(SnapshotKind::HeapStats),
    },
    Route {
        path: "/pprof/heaphistogram",
        handler: RouteHandler::Snapshot(SnapshotKind::HeapHistogram),
    },
    Route {
        path: "/pprof/growth",
        handler: RouteHandler::Snapshot(SnapshotKind::Growth),
    },
    Route {
        path: "/pprof/cmdline",
        handler: RouteHandler::Snapshot(SnapshotKind::Cmdline),
    },
    Route {
        path: "/pprof/symbol",
        handler: RouteHandler::Snapshot(SnapshotKind::Symbol),
    },
];

/// Resolve a request path to its handler descriptor.
pub fn find_route(path: &str) -> Option<RouteHandler> {
    ROUTES
        .iter()
        .find(|route| route.path == path)
        .map(|route| route.handler)
}
