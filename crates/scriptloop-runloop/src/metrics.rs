//! Coordinator metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coordinator metrics.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Triggers that were accepted and given an index.
    pub triggers_accepted: AtomicU64,

    /// Triggers refused because the script was already released.
    pub triggers_rejected: AtomicU64,

    /// Invocations that left the outer group.
    pub invocations_completed: AtomicU64,

    /// Script routines that panicked.
    pub panics: AtomicU64,

    /// Start time.
    start_time: parking_lot::RwLock<Option<Instant>>,
}

impl CoordinatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of the coordinator.
    pub fn mark_start(&self) {
        *self.start_time.write() = Some(Instant::now());
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn record_trigger_accepted(&self) {
        self.triggers_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_trigger_rejected(&self) {
        self.triggers_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invocation_completed(&self) {
        self.invocations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the metrics. `in_flight` is the outer group's count.
    pub fn snapshot(&self, in_flight: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            uptime_secs: self.uptime_secs(),
            triggers_accepted: self.triggers_accepted.load(Ordering::Relaxed),
            triggers_rejected: self.triggers_rejected.load(Ordering::Relaxed),
            invocations_completed: self.invocations_completed.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
            in_flight: in_flight as u64,
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub triggers_accepted: u64,
    pub triggers_rejected: u64,
    pub invocations_completed: u64,
    pub panics: u64,
    pub in_flight: u64,
}

impl MetricsSnapshot {
    /// Invocations accepted but not yet through their termination delay.
    pub fn pending_invocations(&self) -> u64 {
        self.triggers_accepted
            .saturating_sub(self.invocations_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = CoordinatorMetrics::new();
        assert_eq!(metrics.triggers_accepted.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.uptime_secs(), 0);
    }

    #[test]
    fn test_snapshot() {
        let metrics = CoordinatorMetrics::new();
        metrics.mark_start();
        metrics.record_trigger_accepted();
        metrics.record_trigger_accepted();
        metrics.record_trigger_rejected();
        metrics.record_invocation_completed();
        metrics.record_panic();

        let snapshot = metrics.snapshot(1);
        assert_eq!(snapshot.triggers_accepted, 2);
        assert_eq!(snapshot.triggers_rejected, 1);
        assert_eq!(snapshot.invocations_completed, 1);
        assert_eq!(snapshot.panics, 1);
        assert_eq!(snapshot.in_flight, 1);
        assert_eq!(snapshot.pending_invocations(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = CoordinatorMetrics::new().snapshot(0);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["in_flight"], 0);
        assert!(json["timestamp"].is_string());
    }
}
