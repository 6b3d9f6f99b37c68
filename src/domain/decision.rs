//! Scored decisions produced by the Scorer, consumed once by the
//! Orchestrator.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::id::{DecisionId, RouteId};
use super::score::ScoreFactors;

/// Why a candidate did not qualify for admission.
///
/// Rejections are ordinary pipeline outcomes, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    /// Total cost meets or exceeds the edge; filtered before scoring.
    CostExceedsEdge {
        edge_bps: Decimal,
        cost_bps: Decimal,
    },
    /// Available depth is below the configured floor for the notional.
    LiquidityBelowFloor { ratio: f64, floor: f64 },
    /// Composite confidence fell below the admission threshold.
    LowConfidence { confidence: f64, min: f64 },
    /// Scoring this candidate failed; the candidate is skipped, the batch
    /// continues.
    ScoringFailed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CostExceedsEdge { edge_bps, cost_bps } => {
                write!(f, "cost {cost_bps}bps >= edge {edge_bps}bps")
            }
            Self::LiquidityBelowFloor { ratio, floor } => {
                write!(f, "depth ratio {ratio:.2} below floor {floor:.2}")
            }
            Self::LowConfidence { confidence, min } => {
                write!(f, "confidence {confidence:.3} below minimum {min:.3}")
            }
            Self::ScoringFailed => write!(f, "scoring failed"),
        }
    }
}

/// A candidate with its composite score and admission eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDecision {
    /// Unique decision identity.
    pub id: DecisionId,
    /// The underlying candidate, unchanged from ingestion.
    pub candidate: Candidate,
    /// Route this decision executes on.
    pub route: RouteId,
    /// Individual factor scores.
    pub factors: ScoreFactors,
    /// Weighted composite score in [0, 1].
    pub composite_score: f64,
    /// Composite scaled down for thin route history, in [0, 1].
    pub confidence: f64,
    /// Predicted probability the execution succeeds.
    pub success_probability: f64,
    /// Predicted profit after costs at the candidate notional.
    pub predicted_profit: Decimal,
    /// Present iff the decision is not eligible for admission.
    pub reject_reason: Option<RejectReason>,
}

impl ScoredDecision {
    /// Construct a rejected decision without factor scores.
    #[must_use]
    pub fn rejected(candidate: Candidate, reason: RejectReason) -> Self {
        let route = candidate.route_id();
        let predicted_profit = candidate.profit_after_cost();
        Self {
            id: DecisionId::new(),
            candidate,
            route,
            factors: ScoreFactors::default(),
            composite_score: 0.0,
            confidence: 0.0,
            success_probability: 0.0,
            predicted_profit,
            reject_reason: Some(reason),
        }
    }

    /// True when the decision may be offered to the risk gate.
    #[must_use]
    pub const fn is_admissible(&self) -> bool {
        self.reject_reason.is_none()
    }
}

impl Eq for ScoredDecision {}

impl PartialOrd for ScoredDecision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDecision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.composite_score
            .partial_cmp(&other.composite_score)
            .unwrap_or(Ordering::Equal)
    }
}
