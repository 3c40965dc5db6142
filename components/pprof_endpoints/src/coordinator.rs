//! Session coordinator
//!
//! Deduplicates concurrent profile requests into one engine run per kind
//! and fans the completed artifact out to every waiter.

use std::sync::Arc;
use std::time::Duration;

use inspect_http::{ConnectionFanout, ConnectionId};
use profile_engine::{ProfileEngine, ProfileKind};
use tracing::{debug, error, warn};

use crate::session::ProfileSession;
use crate::timer::CompletionSchedule;

struct ProfileSlot {
    session: ProfileSession,
    engine: Arc<dyn ProfileEngine>,
}

/// Coordinates profiling sessions across both kinds.
///
/// State machine per kind: `Idle → Armed` on the first join into an empty
/// waiter set, `Armed → Idle` when `on_timer_fire` drains the set. There
/// is no abort or cancel transition; an armed session always runs to its
/// full duration.
pub struct SessionCoordinator {
    cpu: ProfileSlot,
    heap: ProfileSlot,
    fanout: Arc<dyn ConnectionFanout>,
    schedule: Arc<dyn CompletionSchedule>,
}

impl SessionCoordinator {
    /// Create a coordinator over the given engines, fan-out sink, and
    /// completion schedule.
    pub fn new(
        cpu_engine: Arc<dyn ProfileEngine>,
        heap_engine: Arc<dyn ProfileEngine>,
        fanout: Arc<dyn ConnectionFanout>,
        schedule: Arc<dyn CompletionSchedule>,
    ) -> Self {
        Self {
            cpu: ProfileSlot {
                session: ProfileSession::new(),
                engine: cpu_engine,
            },
            heap: ProfileSlot {
                session: ProfileSession::new(),
                engine: heap_engine,
            },
            fanout,
            schedule,
        }
    }

    fn slot(&self, kind: ProfileKind) -> &ProfileSlot {
        match kind {
            ProfileKind::Cpu => &self.cpu,
            ProfileKind::Heap => &self.heap,
        }
    }

    /// Join the session for `kind`, starting a run if none is active.
    ///
    /// Only the request that starts the run determines its duration; a
    /// later joiner's `requested_seconds` is accepted and ignored, since
    /// the completion timer is already armed.
    ///
    /// An engine start failure is logged and otherwise swallowed: the
    /// timer is still armed and every waiter is still answered at
    /// completion, possibly with a degraded or empty artifact. A waiting
    /// client is never left permanently unanswered.
    pub fn join(&self, kind: ProfileKind, connection_id: ConnectionId, requested_seconds: u64) {
        let slot = self.slot(kind);
        slot.session.join_or_create(connection_id, || {
            debug!(%kind, seconds = requested_seconds, "starting profiling run");
            if let Err(e) = slot.engine.start() {
                error!(%kind, "profiling engine failed to start: {e}");
            }
            self.schedule
                .arm(kind, Duration::from_secs(requested_seconds));
        });
        debug!(
            %kind,
            waiters = slot.session.waiter_count(),
            "connection {connection_id} joined session"
        );
    }

    /// Complete the active run for `kind` and deliver to every waiter.
    ///
    /// Runs only on the completion dispatcher task. The waiter set is
    /// drained before delivery begins, so a join arriving mid-delivery
    /// starts a fresh session. Every drained waiter receives exactly one
    /// send and one close; the close happens even when the send failed,
    /// so connections cannot leak.
    pub fn on_timer_fire(&self, kind: ProfileKind) {
        let slot = self.slot(kind);

        slot.engine.flush();
        if let Err(e) = slot.engine.stop() {
            warn!(%kind, "profiling engine stop failed: {e}");
        }
        let artifact = match slot.engine.read_artifact() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(%kind, "failed to read profile artifact, delivering empty body: {e}");
                Vec::new()
            }
        };

        let waiters = slot.session.drain();
        debug!(
            %kind,
            waiters = waiters.len(),
            bytes = artifact.len(),
            "profiling run complete, delivering artifact"
        );
        for id in waiters {
            self.fanout.send_by_id(id, &artifact);
            self.fanout.close_by_id(id);
        }
    }

    /// Number of connections currently waiting on `kind`.
    pub fn waiter_count(&self, kind: ProfileKind) -> usize {
        self.slot(kind).session.waiter_count()
    }
}
