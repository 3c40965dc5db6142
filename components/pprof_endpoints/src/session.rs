//! Per-kind session state

use std::collections::HashSet;

use inspect_http::ConnectionId;
use parking_lot::Mutex;

/// The transient coordination state for one profiling kind.
///
/// A session logically exists while the waiter set is non-empty: it is
/// created the instant the set goes from empty to non-empty and destroyed
/// by the drain at completion. There is no persistent identity across
/// runs.
#[derive(Default)]
pub struct ProfileSession {
    waiters: Mutex<HashSet<ConnectionId>>,
}

impl ProfileSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a waiter, invoking `on_create` first if the set was empty.
    ///
    /// `on_create` runs under the session lock, which is what makes the
    /// check-then-start sequence atomic against concurrent joins: exactly
    /// one caller observes the empty set.
    pub fn join_or_create<F: FnOnce()>(&self, id: ConnectionId, on_create: F) {
        let mut waiters = self.waiters.lock();
        if waiters.is_empty() {
            on_create();
        }
        waiters.insert(id);
    }

    /// Atomically move the waiter set out, leaving it empty.
    ///
    /// Called once per completed run, before delivery begins, so a join
    /// arriving mid-delivery starts a brand-new session instead of
    /// attaching to one being torn down.
    pub fn drain(&self) -> HashSet<ConnectionId> {
        std::mem::take(&mut *self.waiters.lock())
    }

    /// Number of connections currently waiting.
    pub fn waiter_count(&self) -> usize {
        self.waiters.lock().len()
    }
}
