//! Coordinator lifecycle state and exit reasons.

use serde::{Deserialize, Serialize};

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CoordinatorState {
    /// Constructed, `start` not yet called.
    Created = 0,
    /// Accepting triggers.
    Running = 1,
    /// Cancellation requested; teardown pending.
    Terminating = 2,
    /// Teardown ran and the script was released.
    Terminated = 3,
}

impl From<u8> for CoordinatorState {
    fn from(v: u8) -> Self {
        match v {
            0 => CoordinatorState::Created,
            1 => CoordinatorState::Running,
            2 => CoordinatorState::Terminating,
            3 => CoordinatorState::Terminated,
            _ => CoordinatorState::Created,
        }
    }
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinatorState::Created => write!(f, "created"),
            CoordinatorState::Running => write!(f, "running"),
            CoordinatorState::Terminating => write!(f, "terminating"),
            CoordinatorState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why the coordinator asked its host to exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Every invocation completed and its termination delay elapsed.
    Quiescent,
    /// `terminate` was called explicitly.
    Requested,
    /// A script routine panicked.
    Panicked(String),
}

impl ExitReason {
    /// Process exit code for this reason.
    pub fn code(&self) -> i32 {
        match self {
            ExitReason::Quiescent | ExitReason::Requested => 0,
            // Same status the default panic runtime exits with.
            ExitReason::Panicked(_) => 101,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code() == 0
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Quiescent => write!(f, "quiescent"),
            ExitReason::Requested => write!(f, "requested"),
            ExitReason::Panicked(msg) => write!(f, "panicked: {}", msg),
        }
    }
}
