//! Mock execution backend with scripted outcomes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{ExecutionReport, ScoredDecision};
use crate::error::ExecutionError;
use crate::orchestrator::ExecutionBackend;

/// Scripted execution backend.
///
/// Pops queued outcomes in order and falls back to a default report once
/// the script is exhausted. Tracks call and concurrency statistics so
/// tests can assert dispatch behavior.
pub struct ScriptedBackend {
    default: ExecutionReport,
    script: Mutex<VecDeque<Result<ExecutionReport, ExecutionError>>>,
    latency: Duration,
    calls: AtomicUsize,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend that always returns `report`.
    #[must_use]
    pub fn always(report: ExecutionReport) -> Self {
        Self {
            default: report,
            script: Mutex::new(VecDeque::new()),
            latency: Duration::from_millis(5),
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Set a fixed per-call latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue one outcome ahead of the default.
    pub fn push(&self, outcome: Result<ExecutionReport, ExecutionError>) {
        self.script.lock().push_back(outcome);
    }

    /// Total `execute` calls observed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `execute` calls observed.
    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn execute(
        &self,
        _decision: &ScoredDecision,
        _size: Decimal,
    ) -> Result<ExecutionReport, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(self.default.clone()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
