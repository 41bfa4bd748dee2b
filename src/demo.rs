//! Demo script hosted by `scriptloop run`.
//!
//! Every invocation fans out a few timed sub-tasks on the meta context, so
//! the process stays up for roughly `work + delay` after the last trigger.
//! Send SIGUSR1 (or run `scriptloop reactivate`) to trigger it again.

use std::time::Duration;

use tracing::{debug, info, warn};

use scriptloop_runloop::{Coordinator, Invocation, Script};

pub(crate) struct DemoScript {
    delay: Duration,
    work: Duration,
    sub_tasks: usize,
}

impl DemoScript {
    pub(crate) fn new(delay: Duration, work: Duration, sub_tasks: usize) -> Self {
        Self {
            delay,
            work,
            sub_tasks,
        }
    }
}

impl Script for DemoScript {
    type Context = String;

    fn set_up(&self, coordinator: &Coordinator<Self>) {
        coordinator.set_termination_delay(self.delay);
        coordinator.set_cancellation_handler(Some(|| {
            warn!("Termination requested; running sub-tasks will stop early");
        }));
        info!(
            delay_ms = self.delay.as_millis() as u64,
            sub_tasks = self.sub_tasks,
            "Demo script set up"
        );
    }

    fn main(&self, coordinator: &Coordinator<Self>, invocation: Invocation<String>) {
        let index = invocation.index();
        info!(
            index,
            initial = invocation.is_initial(),
            context = invocation.context().map(String::as_str).unwrap_or("-"),
            "Demo invocation"
        );

        for task in 0..self.sub_tasks {
            let guard = invocation.group().enter_guard();
            let token = coordinator.cancellation_token();
            let work = self.work;
            coordinator.meta_context().spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(work) => debug!(index, task, "Sub-task finished"),
                    _ = token.cancelled() => debug!(index, task, "Sub-task cancelled"),
                }
                drop(guard);
            });
        }
    }

    fn tear_down(&self, coordinator: &Coordinator<Self>) {
        let metrics = coordinator.metrics();
        match serde_json::to_string(&metrics) {
            Ok(json) => info!(metrics = %json, "Demo script torn down"),
            Err(e) => warn!(error = %e, "Demo script torn down; metrics unavailable"),
        }
    }
}
