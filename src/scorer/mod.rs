//! Multi-factor scoring and ranking of candidates.
//!
//! Candidates whose total cost meets or exceeds their edge are rejected
//! by a cheap pre-filter before any factor computation. Survivors are
//! scored on five normalized factors, combined with the configured
//! weights, and ranked most-favorable first. Confidence is scaled down
//! for routes with thin history; decisions below the minimum confidence
//! carry a rejection reason and are not eligible for admission.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, trace};

use crate::config::ScorerConfig;
use crate::domain::{
    Candidate, MarketRegime, RejectReason, RouteStats, ScoreFactors, ScoredDecision, DecisionId,
};
use crate::learner::{Calibration, RouteStatsBook};

/// Multi-factor candidate scorer.
pub struct Scorer {
    config: ScorerConfig,
    stats: Arc<RouteStatsBook>,
    calibration: Arc<Calibration>,
}

impl Scorer {
    #[must_use]
    pub fn new(
        config: ScorerConfig,
        stats: Arc<RouteStatsBook>,
        calibration: Arc<Calibration>,
    ) -> Self {
        Self {
            config,
            stats,
            calibration,
        }
    }

    /// Score and rank a batch of candidates, most-favorable first.
    ///
    /// Every candidate yields a decision; ineligible ones carry a
    /// rejection reason. A scoring failure on one candidate skips only
    /// that candidate.
    #[must_use]
    pub fn rank(&self, candidates: &[Candidate], regime: MarketRegime) -> Vec<ScoredDecision> {
        let mut decisions: Vec<ScoredDecision> = candidates
            .iter()
            .map(|candidate| self.score(candidate.clone(), regime))
            .collect();

        decisions.sort_by(|a, b| b.cmp(a));
        decisions
    }

    /// Score a single candidate.
    fn score(&self, candidate: Candidate, regime: MarketRegime) -> ScoredDecision {
        // Cheap pre-filter: never spend factor computation on a candidate
        // whose costs already eat the edge.
        let edge_bps = candidate.edge_bps;
        let cost_bps = candidate.total_cost_bps();
        if cost_bps >= edge_bps {
            trace!(route = %candidate.route_id(), %edge_bps, %cost_bps, "Cost filter");
            return ScoredDecision::rejected(
                candidate,
                RejectReason::CostExceedsEdge { edge_bps, cost_bps },
            );
        }

        let depth_ratio = candidate.depth_ratio().to_f64().unwrap_or(0.0);
        if depth_ratio < self.config.liquidity_floor {
            return ScoredDecision::rejected(
                candidate,
                RejectReason::LiquidityBelowFloor {
                    ratio: depth_ratio,
                    floor: self.config.liquidity_floor,
                },
            );
        }

        let route = candidate.route_id();
        let stats = self.stats.get(&route);
        let factors = self.factors(&candidate, regime, depth_ratio, stats.as_ref());

        if !factors_finite(&factors) {
            debug!(route = %route, "Non-finite factor, skipping candidate");
            return ScoredDecision::rejected(candidate, RejectReason::ScoringFailed);
        }

        let weights = self
            .config
            .weights
            .with_history_gain(self.calibration.gain());
        let composite = factors.composite(&weights);

        let sample_count = stats.as_ref().map_or(0, |s| s.sample_count);
        let confidence = composite * self.confidence_ramp(sample_count);
        let success_probability = self.success_probability(&factors, stats.as_ref());
        let predicted_profit = candidate.profit_after_cost();

        let reject_reason = if confidence < self.config.min_confidence {
            Some(RejectReason::LowConfidence {
                confidence,
                min: self.config.min_confidence,
            })
        } else {
            None
        };

        ScoredDecision {
            id: DecisionId::new(),
            candidate,
            route,
            factors,
            composite_score: composite,
            confidence,
            success_probability,
            predicted_profit,
            reject_reason,
        }
    }

    fn factors(
        &self,
        candidate: &Candidate,
        regime: MarketRegime,
        depth_ratio: f64,
        stats: Option<&RouteStats>,
    ) -> ScoreFactors {
        let net_edge_bps = candidate.net_edge_bps().to_f64().unwrap_or(0.0);
        let edge_quality = (net_edge_bps / self.config.edge_saturation_bps).clamp(0.0, 1.0);

        // Execution risk: how much edge the costs consume, and how many
        // hops can go wrong.
        let edge_bps = candidate.edge_bps.to_f64().unwrap_or(0.0);
        let cost_share = if edge_bps > 0.0 {
            (candidate.total_cost_bps().to_f64().unwrap_or(0.0) / edge_bps).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let max_hops = f64::from(self.config.max_hops.max(2));
        let hop_share =
            (f64::from(candidate.hops.saturating_sub(1)) / (max_hops - 1.0)).clamp(0.0, 1.0);
        let execution_risk = (1.0 - cost_share) * 0.5 + (1.0 - hop_share) * 0.5;

        let regime_fit = self.config.regime_fit.get(regime).clamp(0.0, 1.0);

        let floor = self.config.liquidity_floor;
        let saturation = self.config.liquidity_saturation.max(floor + f64::EPSILON);
        let liquidity = ((depth_ratio - floor) / (saturation - floor)).clamp(0.0, 1.0);

        let route_history = match stats {
            Some(s) if s.sample_count >= self.config.min_history_samples => s.history_score(),
            _ => crate::domain::stats::NEUTRAL_WIN_RATE,
        };

        ScoreFactors::new(
            edge_quality,
            execution_risk,
            regime_fit,
            liquidity,
            route_history,
        )
    }

    /// Confidence scale from route maturity: `new_route_confidence` for
    /// unseen routes, ramping to 1 at `full_confidence_samples`.
    fn confidence_ramp(&self, sample_count: u64) -> f64 {
        let full = self.config.full_confidence_samples.max(1);
        let progress = (sample_count as f64 / full as f64).min(1.0);
        let floor = self.config.new_route_confidence.clamp(0.0, 1.0);
        floor + (1.0 - floor) * progress
    }

    fn success_probability(&self, factors: &ScoreFactors, stats: Option<&RouteStats>) -> f64 {
        let history_win = match stats {
            Some(s) if s.sample_count >= self.config.min_history_samples => s.win_rate,
            _ => crate::domain::stats::NEUTRAL_WIN_RATE,
        };
        let p = 0.4 * history_win
            + 0.3 * factors.execution_risk
            + 0.2 * factors.liquidity
            + 0.1 * factors.regime_fit;
        p.clamp(0.05, 0.95)
    }
}

fn factors_finite(factors: &ScoreFactors) -> bool {
    factors.edge_quality.is_finite()
        && factors.execution_risk.is_finite()
        && factors.regime_fit.is_finite()
        && factors.liquidity.is_finite()
        && factors.route_history.is_finite()
}
