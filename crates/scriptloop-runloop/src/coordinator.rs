//! Coordinator core.
//!
//! The coordinator turns triggers into invocations of a [`Script`] and decides
//! when nothing is happening any more, so the host can shut down.
//!
//! Every accepted trigger joins the *outer* completion group and stays there
//! until three things have happened, in this order:
//!
//! ```text
//! trigger ──► main returns ──► inner group empty ──► termination delay ──► outer.leave()
//! ```
//!
//! When the outer group empties, the coordinator terminates: the cancellation
//! flag is set, the script is torn down and released, and waiters on
//! [`Coordinator::wait_for_exit`] are released.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cancel::CancellationFlag;
use crate::config::RunLoopConfig;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::group::CompletionGroup;
use crate::metrics::CoordinatorMetrics;
use crate::scheduler::Scheduler;
use crate::script::Script;
use crate::state::{CoordinatorState, ExitReason};

/// Shared coordinator state.
pub(crate) struct CoordinatorInner<S: Script> {
    /// The script; `None` once teardown released it.
    pub(crate) script: RwLock<Option<Arc<S>>>,

    /// Index handed to the next accepted trigger.
    pub(crate) next_index: AtomicU64,

    /// One member per invocation that has not finished its termination delay.
    pub(crate) outer: CompletionGroup,

    pub(crate) cancellation: CancellationFlag,

    /// Termination delay in nanoseconds, read when an invocation's work drains.
    pub(crate) termination_delay_nanos: AtomicU64,

    pub(crate) scheduler: Scheduler,

    pub(crate) state: AtomicU8,

    /// Set by the first teardown to run.
    pub(crate) teardown_claimed: AtomicBool,

    pub(crate) exit_tx: watch::Sender<Option<ExitReason>>,

    pub(crate) metrics: Arc<CoordinatorMetrics>,
}

/// Drives a [`Script`] from triggers to process exit.
///
/// A cheap handle: clones share the same coordinator. Every script callback
/// receives a reference to it.
pub struct Coordinator<S: Script> {
    pub(crate) inner: Arc<CoordinatorInner<S>>,
}

impl<S: Script> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Script> Coordinator<S> {
    /// Create a coordinator owning `script`. Nothing runs until [`start`](Self::start).
    pub fn new(script: S, scheduler: Scheduler, config: &RunLoopConfig) -> Self {
        let (exit_tx, _) = watch::channel(None);

        let inner = CoordinatorInner {
            script: RwLock::new(Some(Arc::new(script))),
            next_index: AtomicU64::new(0),
            outer: CompletionGroup::new(),
            cancellation: CancellationFlag::new(),
            termination_delay_nanos: AtomicU64::new(duration_to_nanos(
                config.termination_delay(),
            )),
            scheduler,
            state: AtomicU8::new(CoordinatorState::Created as u8),
            teardown_claimed: AtomicBool::new(false),
            exit_tx,
            metrics: Arc::new(CoordinatorMetrics::new()),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Run the startup sequence: `set_up`, the first invocation, then the
    /// observer that terminates once the outer group empties.
    pub fn start(&self) -> CoordinatorResult<()> {
        self.inner
            .state
            .compare_exchange(
                CoordinatorState::Created as u8,
                CoordinatorState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|s| CoordinatorError::AlreadyStarted(CoordinatorState::from(s)))?;
        self.inner.metrics.mark_start();

        // Keeps the outer group non-empty until the observer is in place, so
        // triggers from `set_up` and the first invocation can join it.
        let startup = self.inner.outer.enter_guard();

        let script = self
            .inner
            .script
            .read()
            .clone()
            .ok_or(CoordinatorError::Terminated)?;
        debug!("Running script set_up");
        script.set_up(self);
        drop(script);

        match self.trigger_main(None) {
            Ok(_) => {}
            Err(CoordinatorError::Terminated) => {
                debug!("Script terminated during set_up; skipping first invocation");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        self.install_termination_observer();
        drop(startup);
        info!(
            delay_ms = self.termination_delay().as_millis() as u64,
            "Coordinator started"
        );
        Ok(())
    }

    /// Terminate once every accepted invocation has left the outer group.
    fn install_termination_observer(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.outer.notify(self.inner.scheduler.meta(), move || {
            if let Some(inner) = weak.upgrade() {
                let coordinator = Coordinator { inner };
                info!("All invocations complete");
                coordinator.terminate_with(Duration::ZERO, ExitReason::Quiescent);
            }
        });
    }

    pub(crate) fn set_state(&self, state: CoordinatorState) {
        self.inner.state.store(state as u8, Ordering::SeqCst);
    }
}

impl<S: Script> std::fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.state())
            .field("next_index", &self.inner.next_index.load(Ordering::SeqCst))
            .field("in_flight", &self.in_flight())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub(crate) fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
