//! Daemon-related errors.

use std::path::PathBuf;

use scriptloop_runloop::CoordinatorError;
use thiserror::Error;

/// Errors that can occur while hosting a script process.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// PID file already exists and its process is alive.
    #[error("Instance already running (PID file: {path}, PID: {pid})")]
    AlreadyRunning { path: PathBuf, pid: u32 },

    /// Failed to create PID file.
    #[error("Failed to create PID file at {path}: {reason}")]
    PidFileCreation { path: PathBuf, reason: String },

    /// Failed to read PID file.
    #[error("Failed to read PID file at {path}: {reason}")]
    PidFileRead { path: PathBuf, reason: String },

    /// Failed to remove PID file.
    #[error("Failed to remove PID file at {path}: {reason}")]
    PidFileRemoval { path: PathBuf, reason: String },

    /// Failed to set up signal handlers.
    #[error("Failed to set up signal handlers: {0}")]
    SignalSetup(String),

    /// No live instance behind the PID file.
    #[error("No running instance found")]
    NotRunning,

    /// Coordinator refused an operation.
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic daemon error.
    #[error("{0}")]
    Custom(String),
}
