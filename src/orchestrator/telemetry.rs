//! Observability counters for the orchestrator.
//!
//! Counters are exposed for external logging and dashboards; nothing in
//! the decision path reads them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counter block updated by the tick loop and execution tasks.
#[derive(Debug, Default)]
pub struct Telemetry {
    admitted: AtomicU64,
    rejected_by_scorer: AtomicU64,
    rejected_by_breaker: AtomicU64,
    rejected_by_cooldown: AtomicU64,
    rejected_by_concurrency: AtomicU64,
    dropped_malformed: AtomicU64,
    deferred: AtomicU64,
    timeouts: AtomicU64,
    completed: AtomicU64,
}

impl Telemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_rejected_by_scorer(&self) {
        self.rejected_by_scorer.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_rejected_by_breaker(&self) {
        self.rejected_by_breaker.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_rejected_by_cooldown(&self) {
        self.rejected_by_cooldown.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_rejected_by_concurrency(&self) {
        self.rejected_by_concurrency.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_dropped_malformed(&self) {
        self.dropped_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_deferred(&self) {
        self.deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Completed executions so far; useful for draining in tests.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Point-in-time counter values.
    #[must_use]
    pub fn snapshot(&self, in_flight: u64) -> TelemetrySnapshot {
        TelemetrySnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected_by_scorer: self.rejected_by_scorer.load(Ordering::Relaxed),
            rejected_by_breaker: self.rejected_by_breaker.load(Ordering::Relaxed),
            rejected_by_cooldown: self.rejected_by_cooldown.load(Ordering::Relaxed),
            rejected_by_concurrency: self.rejected_by_concurrency.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            deferred: self.deferred.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            in_flight,
        }
    }
}

/// Serializable counter snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub admitted: u64,
    pub rejected_by_scorer: u64,
    pub rejected_by_breaker: u64,
    pub rejected_by_cooldown: u64,
    pub rejected_by_concurrency: u64,
    pub dropped_malformed: u64,
    pub deferred: u64,
    pub timeouts: u64,
    pub completed: u64,
    pub in_flight: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let t = Telemetry::new();
        t.incr_admitted();
        t.incr_admitted();
        t.incr_rejected_by_cooldown();

        let snap = t.snapshot(1);
        assert_eq!(snap.admitted, 2);
        assert_eq!(snap.rejected_by_cooldown, 1);
        assert_eq!(snap.in_flight, 1);
        assert_eq!(snap.timeouts, 0);
    }
}
