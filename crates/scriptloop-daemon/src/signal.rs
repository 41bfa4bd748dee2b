//! Signal handling: OS signals become coordinator operations.
//!
//! | Signal            | Action                          |
//! |-------------------|---------------------------------|
//! | SIGTERM, SIGINT   | [`DaemonSignal::Shutdown`]      |
//! | SIGUSR1, SIGHUP   | [`DaemonSignal::Reactivate`]    |

use std::time::Duration;

use scriptloop_runloop::{Coordinator, CoordinatorError, Script};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::DaemonError;

/// Control action delivered to a running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    /// Terminate immediately (SIGTERM, SIGINT).
    Shutdown,
    /// Trigger another invocation (SIGUSR1, SIGHUP).
    Reactivate,
}

impl std::fmt::Display for DaemonSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonSignal::Shutdown => write!(f, "SHUTDOWN"),
            DaemonSignal::Reactivate => write!(f, "REACTIVATE"),
        }
    }
}

impl DaemonSignal {
    /// Apply this action to `coordinator`.
    ///
    /// Returns the index of the invocation a reactivation started. A
    /// reactivation arriving after teardown is dropped with `Ok(None)`.
    pub fn apply<S: Script>(self, coordinator: &Coordinator<S>) -> Result<Option<u64>, DaemonError> {
        match self {
            DaemonSignal::Shutdown => {
                coordinator.terminate(Duration::ZERO);
                Ok(None)
            }
            DaemonSignal::Reactivate => match coordinator.trigger_main(None) {
                Ok(index) => Ok(Some(index)),
                Err(CoordinatorError::Terminated) => {
                    debug!("Reactivation ignored: already terminated");
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}

/// Listener tasks feeding OS signals into a coordinator.
///
/// Listeners stop when the bridge is dropped.
#[derive(Debug)]
pub struct SignalBridge {
    listeners: Vec<JoinHandle<()>>,
}

impl SignalBridge {
    /// Install the listeners. Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn install<S: Script>(coordinator: &Coordinator<S>) -> Result<Self, DaemonError> {
        use tokio::signal::unix::SignalKind;

        let listeners = vec![
            listen(coordinator, SignalKind::terminate(), "SIGTERM", DaemonSignal::Shutdown)?,
            listen(coordinator, SignalKind::interrupt(), "SIGINT", DaemonSignal::Shutdown)?,
            listen(coordinator, SignalKind::user_defined1(), "SIGUSR1", DaemonSignal::Reactivate)?,
            listen(coordinator, SignalKind::hangup(), "SIGHUP", DaemonSignal::Reactivate)?,
        ];

        info!("OS signal handlers installed (SIGTERM, SIGINT, SIGUSR1, SIGHUP)");
        Ok(Self { listeners })
    }

    /// Install the listeners (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn install<S: Script>(coordinator: &Coordinator<S>) -> Result<Self, DaemonError> {
        let coordinator = coordinator.clone();

        // Only Ctrl+C is available on non-Unix
        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C");
                let _ = DaemonSignal::Shutdown.apply(&coordinator);
            }
        });

        info!("OS signal handlers installed (Ctrl+C only)");
        Ok(Self {
            listeners: vec![listener],
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

#[cfg(unix)]
fn listen<S: Script>(
    coordinator: &Coordinator<S>,
    kind: tokio::signal::unix::SignalKind,
    name: &'static str,
    action: DaemonSignal,
) -> Result<JoinHandle<()>, DaemonError> {
    let mut stream = tokio::signal::unix::signal(kind)
        .map_err(|e| DaemonError::SignalSetup(format!("{}: {}", name, e)))?;

    let coordinator = coordinator.clone();
    Ok(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            info!(signal = name, action = %action, "Received signal");
            if let Err(e) = action.apply(&coordinator) {
                warn!(signal = name, error = %e, "Failed to apply signal");
            }
        }
    }))
}

/// Send a control action to another running instance.
#[cfg(unix)]
pub fn send_signal_to_pid(pid: u32, signal: DaemonSignal) -> Result<(), DaemonError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let nix_signal = match signal {
        DaemonSignal::Shutdown => Signal::SIGTERM,
        DaemonSignal::Reactivate => Signal::SIGUSR1,
    };
    let raw = i32::try_from(pid)
        .map_err(|_| DaemonError::Custom(format!("PID {} out of range", pid)))?;

    kill(Pid::from_raw(raw), nix_signal).map_err(|e| {
        DaemonError::Custom(format!("Failed to send {} to PID {}: {}", signal, pid, e))
    })?;

    info!("Sent {} to PID {}", signal, pid);
    Ok(())
}

#[cfg(not(unix))]
pub fn send_signal_to_pid(_pid: u32, _signal: DaemonSignal) -> Result<(), DaemonError> {
    Err(DaemonError::Custom(
        "Signal sending not supported on this platform".to_string(),
    ))
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
