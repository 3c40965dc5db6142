//! Session coordination and endpoint handlers
//!
//! This is the heart of the inspector: concurrent profile requests are
//! deduplicated into one underlying engine run per kind, a completion
//! timer bounds the run, and the resulting artifact is fanned out to every
//! connection that joined before completion. The one-shot snapshot
//! endpoints and the static route table live here too.

mod coordinator;
mod handlers;
mod routes;
mod session;
mod timer;
mod validation;

pub use coordinator::SessionCoordinator;
pub use handlers::{
    handle_cmdline, handle_growth, handle_heap, handle_heap_histogram, handle_heap_stats,
    handle_profile, handle_symbol, HEAP_PROFILE_WINDOW_SECONDS, SYMBOL_CAPABILITY,
};
pub use routes::{find_route, Route, RouteHandler, SnapshotKind, ROUTES};
pub use session::ProfileSession;
pub use timer::{spawn_completion_dispatcher, CompletionSchedule, CompletionTimer};
pub use validation::{
    parse_profile_seconds, DEFAULT_PROFILE_SECONDS, INVALID_PROFILE_SECONDS, MAX_PROFILE_SECONDS,
};
