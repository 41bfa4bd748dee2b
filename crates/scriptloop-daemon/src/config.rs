//! Process hosting configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// How the host process is supervised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Path to PID file.
    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,

    /// Whether a second launch reactivates the running instance instead of
    /// starting its own coordinator.
    #[serde(default = "default_single_instance")]
    pub single_instance: bool,

    /// Whether to map SIGTERM/SIGINT to termination and SIGUSR1/SIGHUP to
    /// a new trigger.
    #[serde(default = "default_handle_signals")]
    pub handle_signals: bool,
}

fn default_pid_file() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".scriptloop").join("scriptloop.pid"))
        .unwrap_or_else(|| PathBuf::from("/tmp/scriptloop.pid"))
}

fn default_single_instance() -> bool {
    true
}

fn default_handle_signals() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            pid_file: default_pid_file(),
            single_instance: default_single_instance(),
            handle_signals: default_handle_signals(),
        }
    }
}

impl DaemonConfig {
    /// Create a new daemon config with the given PID file path.
    pub fn with_pid_file(pid_file: PathBuf) -> Self {
        Self {
            pid_file,
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), DaemonError> {
        if self.single_instance && self.pid_file.as_os_str().is_empty() {
            return Err(DaemonError::Config(
                "pid_file must be set when single_instance is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
