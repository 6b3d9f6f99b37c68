//! Builders for domain primitives used across tests.
//!
//! Concise factory functions for [`Candidate`], [`ScoredDecision`],
//! [`ExecutionRecord`], and [`ExecutionReport`] so tests focus on
//! assertions rather than construction boilerplate.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Candidate, CandidateSource, CostBreakdown, DecisionId, ExecutionOutcome, ExecutionRecord,
    ExecutionReport, RouteId, ScoreFactors, ScoredDecision,
};

/// A well-formed candidate with the given edge and total cost (bps).
///
/// Notional 10_000, depth 50_000, two hops; the cost is split evenly
/// between gas and protocol fee.
pub fn candidate(symbol: &str, venue: &str, edge_bps: Decimal, cost_bps: Decimal) -> Candidate {
    candidate_with_depth(symbol, venue, edge_bps, cost_bps, dec!(50_000))
}

/// Same as [`candidate`] with an explicit liquidity depth.
pub fn candidate_with_depth(
    symbol: &str,
    venue: &str,
    edge_bps: Decimal,
    cost_bps: Decimal,
    depth: Decimal,
) -> Candidate {
    let half = cost_bps / dec!(2);
    Candidate {
        symbol: symbol.to_string(),
        venue: venue.to_string(),
        source: CandidateSource::OnChain,
        edge_bps,
        notional: dec!(10_000),
        costs: CostBreakdown {
            gas_bps: half,
            protocol_fee_bps: cost_bps - half,
            slippage_bps: Decimal::ZERO,
            hop_penalty_bps: Decimal::ZERO,
        },
        hops: 2,
        liquidity_depth: depth,
        observed_at: Utc::now(),
    }
}

/// An admissible scored decision over the candidate.
pub fn scored(candidate: Candidate) -> ScoredDecision {
    let route = candidate.route_id();
    let predicted_profit = candidate.profit_after_cost();
    ScoredDecision {
        id: DecisionId::new(),
        candidate,
        route,
        factors: ScoreFactors::new(0.5, 0.6, 0.8, 0.9, 0.5),
        composite_score: 0.8,
        confidence: 0.7,
        success_probability: 0.65,
        predicted_profit,
        reject_reason: None,
    }
}

/// A terminal execution record for `route` with cost 2 and size 100.
pub fn record_for(
    route: &str,
    outcome: ExecutionOutcome,
    actual_profit: Decimal,
    predicted_profit: Decimal,
) -> ExecutionRecord {
    ExecutionRecord {
        decision_id: DecisionId::new(),
        route: RouteId::new(route),
        outcome,
        actual_profit,
        actual_cost: dec!(2),
        size: dec!(100),
        predicted_profit,
        latency: Duration::from_millis(40),
        completed_at: Utc::now(),
    }
}

/// A successful backend report.
pub fn success_report(profit: Decimal, cost: Decimal) -> ExecutionReport {
    ExecutionReport {
        success: true,
        actual_profit: profit,
        actual_cost: cost,
        latency: Duration::from_millis(10),
        detail: None,
    }
}

/// A failed backend report with a small cost.
pub fn failure_report() -> ExecutionReport {
    ExecutionReport {
        success: false,
        actual_profit: Decimal::ZERO,
        actual_cost: dec!(1),
        latency: Duration::from_millis(10),
        detail: Some("no fill".to_string()),
    }
}
