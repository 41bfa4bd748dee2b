//! Configuration for the coordinator and its execution contexts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoordinatorError, CoordinatorResult};

/// RunLoop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLoopConfig {
    /// Initial termination delay in milliseconds. Scripts may change it at runtime.
    #[serde(default)]
    pub termination_delay_ms: u64,

    /// Number of async worker threads backing the meta context.
    #[serde(default = "default_meta_threads")]
    pub meta_threads: usize,

    /// Upper bound on threads running script routines concurrently.
    /// Further invocations queue until a thread frees up.
    #[serde(default = "default_max_work_threads")]
    pub max_work_threads: usize,
}

fn default_meta_threads() -> usize {
    2
}

fn default_max_work_threads() -> usize {
    64
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        Self {
            termination_delay_ms: 0,
            meta_threads: default_meta_threads(),
            max_work_threads: default_max_work_threads(),
        }
    }
}

impl RunLoopConfig {
    /// Config with the given initial termination delay.
    pub fn with_termination_delay(delay: Duration) -> Self {
        Self {
            termination_delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            ..Default::default()
        }
    }

    /// Get the termination delay as Duration.
    pub fn termination_delay(&self) -> Duration {
        Duration::from_millis(self.termination_delay_ms)
    }

    /// Reject thread counts no runtime can be built with.
    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.meta_threads == 0 {
            return Err(CoordinatorError::ConfigError(
                "meta_threads must be at least 1".to_string(),
            ));
        }
        if self.max_work_threads == 0 {
            return Err(CoordinatorError::ConfigError(
                "max_work_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
