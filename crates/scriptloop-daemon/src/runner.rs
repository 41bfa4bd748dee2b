//! Hosting a script as a process.
//!
//! [`ScriptRunner`] owns everything around a [`Coordinator`]: the PID file,
//! the scheduler runtimes and the signal bridge. A second launch while an
//! instance is alive forwards a reactivation to it and returns.

use std::path::Path;

use scriptloop_runloop::{Coordinator, ExitReason, RunLoopConfig, SchedulerRuntime, Script};
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::pid::PidFile;
use crate::signal::{send_signal_to_pid, DaemonSignal, SignalBridge};

/// How a [`ScriptRunner::try_run`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// This process hosted the script until it terminated.
    Exited(ExitReason),
    /// Another instance was running; it was asked to reactivate.
    ForwardedTo { pid: u32 },
}

impl RunOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Exited(reason) => reason.code(),
            RunOutcome::ForwardedTo { .. } => 0,
        }
    }
}

/// Hosts one script for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    runloop: RunLoopConfig,
    daemon: DaemonConfig,
}

impl ScriptRunner {
    pub fn new(runloop: RunLoopConfig, daemon: DaemonConfig) -> Self {
        Self { runloop, daemon }
    }

    pub fn runloop_config(&self) -> &RunLoopConfig {
        &self.runloop
    }

    pub fn daemon_config(&self) -> &DaemonConfig {
        &self.daemon
    }

    /// Process entry point: host `script`, then exit with the outcome's code.
    ///
    /// Never returns. Errors are logged and exit with status 1.
    pub fn run<S: Script>(&self, script: S) -> ! {
        self.run_holding(script, ())
    }

    /// Like [`run`](Self::run), dropping `keep_alive` right before the
    /// process exits. `process::exit` skips destructors, so buffered writers
    /// such as a log guard are handed in here to be flushed.
    pub fn run_holding<S: Script, G>(&self, script: S, keep_alive: G) -> ! {
        let code = match self.try_run(script) {
            Ok(RunOutcome::ForwardedTo { pid }) => {
                info!(pid, "Reactivated running instance");
                0
            }
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                error!("Script host failed: {}", e);
                1
            }
        };
        drop(keep_alive);
        std::process::exit(code)
    }

    /// Host `script` until it terminates, or forward to a live instance.
    ///
    /// Blocks the calling thread. Must not be called from inside a Tokio
    /// runtime: the runner builds its own.
    ///
    /// The PID file is written only after the signal listeners are in place,
    /// and removed as soon as the exit reason is known.
    pub fn try_run<S: Script>(&self, script: S) -> Result<RunOutcome, DaemonError> {
        self.daemon.validate()?;

        if self.daemon.single_instance {
            if let Some(pid) = PidFile::new(&self.daemon.pid_file).live_pid()? {
                return forward_to(pid);
            }
        }

        let runtime = SchedulerRuntime::build(&self.runloop)?;
        let coordinator = Coordinator::new(script, runtime.scheduler(), &self.runloop);

        let result = runtime.block_on(async {
            let _bridge = if self.daemon.handle_signals {
                Some(SignalBridge::install(&coordinator)?)
            } else {
                None
            };

            let pid_file = if self.daemon.single_instance {
                let mut pid_file = PidFile::new(&self.daemon.pid_file);
                match pid_file.try_acquire() {
                    Ok(()) => Some(pid_file),
                    // Lost the race against a concurrent launch.
                    Err(DaemonError::AlreadyRunning { pid, .. }) => return forward_to(pid),
                    Err(e) => return Err(e),
                }
            } else {
                None
            };

            coordinator.start()?;
            let reason = coordinator.wait_for_exit().await;
            drop(pid_file);
            Ok::<_, DaemonError>(RunOutcome::Exited(reason))
        });

        runtime.shutdown();

        let outcome = result?;
        if let RunOutcome::Exited(reason) = &outcome {
            info!(reason = %reason, "Script host exiting");
        }
        Ok(outcome)
    }
}

fn forward_to(pid: u32) -> Result<RunOutcome, DaemonError> {
    info!(pid, "Instance already running; forwarding reactivation");
    send_signal_to_pid(pid, DaemonSignal::Reactivate)?;
    Ok(RunOutcome::ForwardedTo { pid })
}

/// PID of the live instance recorded in `pid_file`.
pub fn running_instance(pid_file: &Path) -> Result<u32, DaemonError> {
    PidFile::new(pid_file)
        .live_pid()?
        .ok_or(DaemonError::NotRunning)
}

/// Deliver `signal` to the live instance recorded in `pid_file`.
pub fn signal_running_instance(pid_file: &Path, signal: DaemonSignal) -> Result<u32, DaemonError> {
    let pid = running_instance(pid_file)?;
    send_signal_to_pid(pid, signal)?;
    Ok(pid)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
