//! Execution backend interface and the paper implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{ExecutionReport, ScoredDecision, BPS_SCALE};
use crate::error::ExecutionError;

/// Performs the actual trade for an admitted, sized decision.
///
/// Implementations must be cancel-safe: the orchestrator drops the call
/// future on timeout and never retries on its own.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Execute the decision at the given size.
    async fn execute(
        &self,
        decision: &ScoredDecision,
        size: Decimal,
    ) -> Result<ExecutionReport, ExecutionError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Simulated fill backend for paper trading and demos.
///
/// Fills succeed with the decision's predicted success probability and
/// capture a random fraction of the predicted edge.
pub struct PaperBackend {
    latency: Duration,
}

impl PaperBackend {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for PaperBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(25))
    }
}

#[async_trait]
impl ExecutionBackend for PaperBackend {
    async fn execute(
        &self,
        decision: &ScoredDecision,
        size: Decimal,
    ) -> Result<ExecutionReport, ExecutionError> {
        let started = Instant::now();
        tokio::time::sleep(self.latency).await;

        let (success, capture) = {
            let mut rng = rand::thread_rng();
            let success = rng.gen_bool(decision.success_probability.clamp(0.0, 1.0));
            let capture: f64 = rng.gen_range(0.6..1.0);
            (success, capture)
        };

        let cost = size * decision.candidate.total_cost_bps() / BPS_SCALE;
        let profit = if success {
            let gross = size * decision.candidate.edge_bps / BPS_SCALE;
            gross * Decimal::try_from(capture).unwrap_or(Decimal::ONE)
        } else {
            Decimal::ZERO
        };

        debug!(
            decision = %decision.id,
            success,
            %profit,
            %cost,
            "Paper fill"
        );

        Ok(ExecutionReport {
            success,
            actual_profit: profit,
            actual_cost: cost,
            latency: started.elapsed(),
            detail: None,
        })
    }

    fn name(&self) -> &'static str {
        "paper"
    }
}
