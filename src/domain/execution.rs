//! Terminal execution outcomes and per-tick dispatch results.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{DecisionId, RouteId};

/// Terminal outcome of a dispatched execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Backend reported a completed trade.
    Success,
    /// Backend reported a failed trade, or the dispatch errored.
    Failure,
    /// The per-call deadline elapsed first. Counts as failure for risk
    /// accounting; a later out-of-band completion is logged only.
    Timeout,
}

impl ExecutionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What the backend reports for a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Whether the trade completed as intended.
    pub success: bool,
    /// Gross realized profit.
    pub actual_profit: Decimal,
    /// Realized execution cost (gas, fees, slippage).
    pub actual_cost: Decimal,
    /// Backend-observed execution latency.
    pub latency: Duration,
    /// Free-form backend detail, e.g. a fill id or failure note.
    pub detail: Option<String>,
}

/// Immutable record of one terminal execution outcome.
///
/// Created exactly once per dispatch (success, failure, or timeout) and
/// never mutated afterwards; RouteStats and RiskState updates key off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// The decision this execution belongs to.
    pub decision_id: DecisionId,
    /// Route the decision executed on.
    pub route: RouteId,
    /// Terminal outcome.
    pub outcome: ExecutionOutcome,
    /// Gross realized profit (zero for timeout).
    pub actual_profit: Decimal,
    /// Realized execution cost (zero for timeout).
    pub actual_cost: Decimal,
    /// Size the orchestrator requested.
    pub size: Decimal,
    /// Profit the scorer predicted, for capture-ratio tracking.
    pub predicted_profit: Decimal,
    /// Observed latency from dispatch to terminal outcome.
    #[serde(with = "duration_millis")]
    pub latency: Duration,
    /// When the terminal outcome was observed.
    pub completed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Net realized profit and loss applied to equity.
    #[must_use]
    pub fn realized_pnl(&self) -> Decimal {
        self.actual_profit - self.actual_cost
    }

    /// Fraction of predicted profit actually captured, clamped to [0, 1].
    /// Neutral 0.0 for failures and for decisions with no predicted profit.
    #[must_use]
    pub fn capture_ratio(&self) -> f64 {
        if !self.outcome.is_success() || self.predicted_profit <= Decimal::ZERO {
            return 0.0;
        }
        let ratio = self.actual_profit / self.predicted_profit;
        ratio.to_f64().unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Per-candidate outcome of one orchestrator tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DispatchResult {
    /// The candidate was admitted, sized, and handed to the backend.
    Dispatched { decision_id: DecisionId, route: RouteId },
    /// The scorer marked the candidate ineligible.
    RejectedByScorer { route: RouteId },
    /// The risk gate refused admission (breaker open or limit hit).
    RejectedByRisk { route: RouteId, reason: String },
    /// The same route executed within the cooldown window.
    RejectedByCooldown { route: RouteId },
    /// No concurrency slot was available.
    RejectedByConcurrency { route: RouteId },
    /// Structurally malformed candidate, dropped before scoring.
    Dropped,
    /// Ranked below the per-tick admission attempt budget.
    Deferred { route: RouteId },
}
