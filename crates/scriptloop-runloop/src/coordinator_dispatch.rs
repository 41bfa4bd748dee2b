//! Invocation dispatch: trigger → main → inner group → delay → outer leave.

use std::any::Any;
use std::sync::atomic::Ordering;

use tracing::{debug, error};

use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::group::CompletionGroup;
use crate::script::{Invocation, Script};
use crate::state::{CoordinatorState, ExitReason};

impl<S: Script> Coordinator<S> {
    /// Start a new invocation of the script's main routine.
    ///
    /// Never blocks and never queues behind running invocations. Callable from
    /// any thread, including from inside a running `main`. Returns the index
    /// given to the new invocation.
    pub fn trigger_main(&self, context: Option<S::Context>) -> CoordinatorResult<u64> {
        if self.state() == CoordinatorState::Created {
            return Err(CoordinatorError::NotStarted);
        }

        // Holding the read lock keeps teardown from releasing the script
        // between the presence check and joining the outer group.
        let (script, index) = {
            let guard = self.inner.script.read();
            let Some(script) = guard.as_ref().cloned() else {
                self.inner.metrics.record_trigger_rejected();
                debug!("Trigger rejected: script already released");
                return Err(CoordinatorError::Terminated);
            };
            // An empty outer group means quiescence was reached and teardown
            // is on its way.
            if !self.inner.outer.try_enter() {
                self.inner.metrics.record_trigger_rejected();
                debug!("Trigger rejected: all invocations already complete");
                return Err(CoordinatorError::Terminated);
            }
            let index = self.inner.next_index.fetch_add(1, Ordering::SeqCst);
            (script, index)
        };
        self.inner.metrics.record_trigger_accepted();

        let group = CompletionGroup::new();
        let invocation = Invocation::new(index, group.clone(), context);
        debug!(
            index,
            in_flight = self.inner.outer.count(),
            "Dispatching invocation"
        );

        let coordinator = self.clone();
        let routine = self.inner.scheduler.run_on_work_context(move || {
            script.main(&coordinator, invocation);
        });

        let coordinator = self.clone();
        self.inner.scheduler.meta().spawn(async move {
            match routine.await {
                Ok(()) => coordinator.await_sub_work(index, group),
                Err(e) if e.is_panic() => {
                    coordinator.routine_panicked(index, panic_message(e.into_panic()));
                }
                Err(_) => debug!(index, "Invocation dropped by runtime shutdown"),
            }
        });

        Ok(index)
    }

    /// `main` has returned; wait for its sub-work, then hold for the delay.
    fn await_sub_work(&self, index: u64, group: CompletionGroup) {
        debug!(index, outstanding = group.count(), "Main routine returned");

        let coordinator = self.clone();
        group.notify(self.inner.scheduler.meta(), move || {
            // Read now, not at trigger time: changes made while this
            // invocation ran still apply to it.
            let delay = coordinator.termination_delay();
            debug!(
                index,
                delay_ms = delay.as_millis() as u64,
                "Invocation work drained"
            );

            let finisher = coordinator.clone();
            coordinator
                .inner
                .scheduler
                .run_on_meta_context_after(delay, move || finisher.finish_invocation(index));
        });
    }

    fn finish_invocation(&self, index: u64) {
        self.inner.metrics.record_invocation_completed();
        self.inner.outer.leave();
        debug!(
            index,
            in_flight = self.inner.outer.count(),
            "Invocation complete"
        );
    }

    fn routine_panicked(&self, index: u64, message: String) {
        error!(index, panic = %message, "Script main routine panicked");
        self.inner.metrics.record_panic();
        self.terminate_with(std::time::Duration::ZERO, ExitReason::Panicked(message));
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
