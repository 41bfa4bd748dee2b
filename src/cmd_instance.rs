//! Commands addressing an already running instance through its PID file.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use scriptloop_daemon::{
    running_instance, signal_running_instance, DaemonError, DaemonSignal, PidFile,
};

/// Trigger another invocation in the running instance.
pub(crate) fn instance_reactivate(pid_file: &Path) -> Result<(), DaemonError> {
    let pid = signal_running_instance(pid_file, DaemonSignal::Reactivate)?;
    println!("Reactivation sent to PID {}", pid);
    Ok(())
}

/// Terminate the running instance and wait up to `wait` for it to exit.
pub(crate) fn instance_stop(pid_file: &Path, wait: Duration) -> Result<(), DaemonError> {
    let pid = signal_running_instance(pid_file, DaemonSignal::Shutdown)?;
    info!(pid, "Waiting for instance to exit");

    let deadline = Instant::now() + wait;
    while Instant::now() < deadline {
        if !PidFile::is_process_running(pid) {
            println!("Instance stopped (PID {})", pid);
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    Err(DaemonError::Custom(format!(
        "PID {} still running after {}s",
        pid,
        wait.as_secs()
    )))
}

/// Print whether an instance is running.
pub(crate) fn instance_status(pid_file: &Path) -> Result<(), DaemonError> {
    println!("scriptloop status");
    println!("=================");
    println!("PID File: {}", pid_file.display());

    match running_instance(pid_file) {
        Ok(pid) => println!("\nInstance is RUNNING (PID: {})", pid),
        Err(DaemonError::NotRunning) => println!("\nInstance is NOT RUNNING"),
        Err(e) => return Err(e),
    }
    Ok(())
}
