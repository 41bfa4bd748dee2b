//! Cancellation and teardown.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::coordinator::Coordinator;
use crate::coordinator_dispatch::panic_message;
use crate::script::Script;
use crate::state::{CoordinatorState, ExitReason};

impl<S: Script> Coordinator<S> {
    /// Request termination.
    ///
    /// Sets the cancellation flag right away, then tears the script down
    /// either inline (`after` is zero) or from a meta-context timer. Running
    /// routines are not interrupted; they observe the flag.
    ///
    /// Safe to call any number of times from any thread: teardown runs once,
    /// on whichever request reaches it first.
    pub fn terminate(&self, after: Duration) {
        self.terminate_with(after, ExitReason::Requested);
    }

    pub(crate) fn terminate_with(&self, after: Duration, reason: ExitReason) {
        if self.inner.cancellation.cancel() {
            info!(
                after_ms = after.as_millis() as u64,
                reason = %reason,
                "Termination requested"
            );
        }
        let _ = self.inner.state.compare_exchange(
            CoordinatorState::Running as u8,
            CoordinatorState::Terminating as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        if after.is_zero() {
            self.run_teardown(reason);
        } else {
            let coordinator = self.clone();
            self.inner
                .scheduler
                .run_on_meta_context_after(after, move || coordinator.run_teardown(reason));
        }
    }

    fn run_teardown(&self, reason: ExitReason) {
        if self.inner.teardown_claimed.swap(true, Ordering::AcqRel) {
            debug!(reason = %reason, "Teardown already ran");
            return;
        }

        let mut reason = reason;
        let script = self.inner.script.write().take();
        if let Some(script) = script {
            debug!("Running script tear_down");
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| script.tear_down(self))) {
                let message = panic_message(payload);
                error!(panic = %message, "Script tear_down panicked");
                self.inner.metrics.record_panic();
                reason = ExitReason::Panicked(message);
            }
        }

        self.set_state(CoordinatorState::Terminated);
        info!(reason = %reason, code = reason.code(), "Coordinator terminated");
        self.inner.exit_tx.send_replace(Some(reason));
    }
}
