//! Coordinator state accessors and script-facing controls.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coordinator::{duration_to_nanos, Coordinator};
use crate::metrics::MetricsSnapshot;
use crate::scheduler::{ExecutionContext, Scheduler};
use crate::script::Script;
use crate::state::{CoordinatorState, ExitReason};

impl<S: Script> Coordinator<S> {
    /// Get current state.
    pub fn state(&self) -> CoordinatorState {
        CoordinatorState::from(self.inner.state.load(Ordering::SeqCst))
    }

    /// Quiescence period each invocation waits after its work drains.
    pub fn termination_delay(&self) -> Duration {
        Duration::from_nanos(self.inner.termination_delay_nanos.load(Ordering::Acquire))
    }

    /// Change the termination delay.
    ///
    /// Applies to every invocation whose work has not drained yet.
    pub fn set_termination_delay(&self, delay: Duration) {
        self.inner
            .termination_delay_nanos
            .store(duration_to_nanos(delay), Ordering::Release);
        debug!(delay_ms = delay.as_millis() as u64, "Termination delay updated");
    }

    /// Whether termination has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Resolve once termination has been requested.
    pub async fn cancelled(&self) {
        self.inner.cancellation.cancelled().await;
    }

    /// Token cancelled when termination is requested, for `tokio::select!`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancellation.token()
    }

    /// Install or clear the callback run inline when termination is first requested.
    pub fn set_cancellation_handler<F>(&self, handler: Option<F>)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.cancellation.set_handler(handler);
    }

    /// Context for short auxiliary callbacks and async sub-work.
    pub fn meta_context(&self) -> &ExecutionContext {
        self.inner.scheduler.meta()
    }

    /// Context script routines run on.
    pub fn work_context(&self) -> &ExecutionContext {
        self.inner.scheduler.work()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Invocations that have not yet finished their termination delay.
    pub fn in_flight(&self) -> usize {
        self.inner.outer.count()
    }

    /// Number of triggers accepted so far; also the next index to be handed out.
    pub fn invocations_started(&self) -> u64 {
        self.inner.next_index.load(Ordering::SeqCst)
    }

    /// Get a snapshot of the metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot(self.in_flight())
    }

    /// Exit reason, once teardown has run.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.inner.exit_tx.borrow().clone()
    }

    /// Resolve with the exit reason once teardown has run.
    pub async fn wait_for_exit(&self) -> ExitReason {
        let mut rx = self.inner.exit_tx.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(reason) => reason.clone(),
            Err(_) => None,
        };
        reason.unwrap_or(ExitReason::Requested)
    }
}
