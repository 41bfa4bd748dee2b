//! Error types for the coordinator.

use thiserror::Error;

use crate::scheduler::ContextKind;
use crate::state::CoordinatorState;

/// Errors that can occur while driving a script.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// `start` was called on a coordinator that is not freshly created.
    #[error("Coordinator already started (state: {0})")]
    AlreadyStarted(CoordinatorState),

    /// A trigger arrived before `start`.
    #[error("Coordinator not started")]
    NotStarted,

    /// The script has been released by teardown; no further triggers are accepted.
    #[error("Coordinator has terminated and released its script")]
    Terminated,

    /// No tokio runtime is available to host the execution contexts.
    #[error("No runtime available: {0}")]
    NoRuntime(String),

    /// Building one of the execution context runtimes failed.
    #[error("Failed to build {context} runtime: {source}")]
    RuntimeBuild {
        context: ContextKind,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
