//! Completion timing
//!
//! Every armed session produces exactly one completion event, and all
//! completion events are consumed by a single dispatcher task per process.
//! That task is the sole caller of `SessionCoordinator::on_timer_fire`,
//! which makes session teardown single-writer: completions are serialized,
//! and the blocking artifact read inside a completion delays at most the
//! next queued completion, never a request handler.

use std::sync::Arc;
use std::time::Duration;

use profile_engine::ProfileKind;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::coordinator::SessionCoordinator;

/// Arms a one-shot completion for a profiling session.
pub trait CompletionSchedule: Send + Sync {
    /// Schedule a completion event for `kind` after `after`. Must not
    /// block; called with the session lock held.
    fn arm(&self, kind: ProfileKind, after: Duration);
}

/// Tokio-backed completion schedule.
///
/// `arm` spawns a sleeper that forwards the kind onto the completion
/// channel when the window elapses; the paired receiver is consumed by
/// [`spawn_completion_dispatcher`].
pub struct CompletionTimer {
    events: mpsc::UnboundedSender<ProfileKind>,
}

impl CompletionTimer {
    /// Create the timer plus the completion-event receiver to hand to the
    /// dispatcher.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProfileKind>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { events: tx }, rx)
    }
}

impl CompletionSchedule for CompletionTimer {
    fn arm(&self, kind: ProfileKind, after: Duration) {
        debug!(%kind, ?after, "arming completion timer");
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The dispatcher may already be shut down; nothing to do then.
            let _ = events.send(kind);
        });
    }
}

/// Spawn the single completion dispatcher task.
///
/// Runs until every `CompletionTimer` clone (and every in-flight sleeper)
/// is gone.
pub fn spawn_completion_dispatcher(
    mut events: mpsc::UnboundedReceiver<ProfileKind>,
    coordinator: Arc<SessionCoordinator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(kind) = events.recv().await {
            coordinator.on_timer_fire(kind);
        }
        debug!("completion dispatcher stopped");
    })
}
