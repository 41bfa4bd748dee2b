//! PID file used to find the running instance.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::DaemonError;

/// PID file manager for single-instance hosting.
///
/// The file is only removed on drop when this process wrote it.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    locked: bool,
}

impl PidFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            locked: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the PID from the file, if there is one.
    pub fn read_pid(&self) -> Result<Option<u32>, DaemonError> {
        if !self.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| DaemonError::PidFileRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let pid = contents
            .trim()
            .parse::<u32>()
            .map_err(|e| DaemonError::PidFileRead {
                path: self.path.clone(),
                reason: format!("Invalid PID format: {}", e),
            })?;

        Ok(Some(pid))
    }

    /// PID of another live process holding this file.
    ///
    /// A file naming this very process, or a dead one, counts as absent.
    pub fn live_pid(&self) -> Result<Option<u32>, DaemonError> {
        Ok(self
            .read_pid()?
            .filter(|&pid| pid != std::process::id() && Self::is_process_running(pid)))
    }

    /// Write the current process PID to the file.
    pub fn write_pid(&mut self) -> Result<(), DaemonError> {
        self.write_pid_value(std::process::id())
    }

    pub(crate) fn write_pid_value(&mut self, pid: u32) -> Result<(), DaemonError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DaemonError::PidFileCreation {
                path: self.path.clone(),
                reason: format!("Failed to create parent directory: {}", e),
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| DaemonError::PidFileCreation {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        write!(file, "{}", pid).map_err(|e| DaemonError::PidFileCreation {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        self.locked = true;
        info!(path = %self.path.display(), pid, "PID file created");
        Ok(())
    }

    pub fn remove(&mut self) -> Result<(), DaemonError> {
        if !self.exists() {
            self.locked = false;
            return Ok(());
        }

        fs::remove_file(&self.path).map_err(|e| DaemonError::PidFileRemoval {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        self.locked = false;
        debug!(path = %self.path.display(), "PID file removed");
        Ok(())
    }

    /// Check if a process with the given PID is alive.
    #[cfg(unix)]
    pub fn is_process_running(pid: u32) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        // Signal 0: existence and permission check only.
        kill(Pid::from_raw(raw), None).is_ok()
    }

    #[cfg(not(unix))]
    pub fn is_process_running(_pid: u32) -> bool {
        // No cheap liveness check; assume the recorded process is alive.
        true
    }

    /// Claim the PID file for this process.
    ///
    /// Fails with [`DaemonError::AlreadyRunning`] when another live process
    /// holds it. Stale files are replaced.
    pub fn try_acquire(&mut self) -> Result<(), DaemonError> {
        if let Some(existing) = self.read_pid()? {
            if existing != std::process::id() && Self::is_process_running(existing) {
                return Err(DaemonError::AlreadyRunning {
                    path: self.path.clone(),
                    pid: existing,
                });
            }

            warn!(
                pid = existing,
                path = %self.path.display(),
                "Replacing stale PID file"
            );
            self.remove()?;
        }

        self.write_pid()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if self.locked {
            if let Err(e) = self.remove() {
                warn!("Failed to remove PID file on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "pid_tests.rs"]
mod tests;
