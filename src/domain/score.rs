//! Scoring factor and weight types for candidate evaluation.
//!
//! Candidates are scored on five factors, each normalized to 0.0-1.0:
//!
//! - **Edge quality**: profit-after-cost relative to notional
//! - **Execution risk**: inverse of cost volatility and hop count
//! - **Regime fit**: how well the candidate suits the current market regime
//! - **Liquidity**: ratio of available depth to notional
//! - **Route history**: historical win rate and profit capture on this route
//!
//! Factors are combined into a composite via configurable weights.

use serde::{Deserialize, Serialize};

/// Individual scoring factors for a candidate.
///
/// Each factor is normalized to the 0.0-1.0 range where higher values
/// indicate a more attractive candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactors {
    /// Profit after cost relative to notional (0.0 to 1.0).
    pub edge_quality: f64,
    /// Inverse of cost volatility and hop count (0.0 to 1.0).
    pub execution_risk: f64,
    /// Fit with the current market regime (0.0 to 1.0).
    pub regime_fit: f64,
    /// Depth available relative to notional (0.0 to 1.0).
    pub liquidity: f64,
    /// Historical performance of this route (0.0 to 1.0).
    pub route_history: f64,
}

impl ScoreFactors {
    /// Creates new score factors with the given values.
    ///
    /// All values should be normalized to the 0.0-1.0 range.
    #[must_use]
    pub const fn new(
        edge_quality: f64,
        execution_risk: f64,
        regime_fit: f64,
        liquidity: f64,
        route_history: f64,
    ) -> Self {
        Self {
            edge_quality,
            execution_risk,
            regime_fit,
            liquidity,
            route_history,
        }
    }

    /// Computes the weighted composite score from these factors.
    ///
    /// Returns the weighted average, clamped to [0, 1]. A zero weight sum
    /// yields zero.
    #[must_use]
    pub fn composite(&self, weights: &ScoreWeights) -> f64 {
        let weighted_sum = self.edge_quality * weights.edge_quality
            + self.execution_risk * weights.execution_risk
            + self.regime_fit * weights.regime_fit
            + self.liquidity * weights.liquidity
            + self.route_history * weights.route_history;

        let weight_sum = weights.sum();
        if weight_sum == 0.0 {
            0.0
        } else {
            (weighted_sum / weight_sum).clamp(0.0, 1.0)
        }
    }
}

impl Default for ScoreFactors {
    fn default() -> Self {
        Self {
            edge_quality: 0.0,
            execution_risk: 0.0,
            regime_fit: 0.0,
            liquidity: 0.0,
            route_history: 0.0,
        }
    }
}

/// Weights for combining score factors into a composite score.
///
/// Configured weights are expected to sum to 1; `Config::validate`
/// enforces this at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub edge_quality: f64,
    pub execution_risk: f64,
    pub regime_fit: f64,
    pub liquidity: f64,
    pub route_history: f64,
}

impl ScoreWeights {
    /// Creates new score weights.
    #[must_use]
    pub const fn new(
        edge_quality: f64,
        execution_risk: f64,
        regime_fit: f64,
        liquidity: f64,
        route_history: f64,
    ) -> Self {
        Self {
            edge_quality,
            execution_risk,
            regime_fit,
            liquidity,
            route_history,
        }
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.edge_quality
            + self.execution_risk
            + self.regime_fit
            + self.liquidity
            + self.route_history
    }

    /// Returns a copy with the route-history weight scaled by `gain`,
    /// as produced by learner recalibration.
    #[must_use]
    pub fn with_history_gain(&self, gain: f64) -> Self {
        Self {
            route_history: self.route_history * gain,
            ..*self
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            edge_quality: 0.35,
            execution_risk: 0.20,
            regime_fit: 0.15,
            liquidity: 0.15,
            route_history: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_is_weighted_average() {
        let factors = ScoreFactors::new(1.0, 0.5, 0.0, 1.0, 0.5);
        let weights = ScoreWeights::new(0.2, 0.2, 0.2, 0.2, 0.2);
        let composite = factors.composite(&weights);
        assert!((composite - 0.6).abs() < 1e-9);
    }

    #[test]
    fn composite_zero_weights_is_zero() {
        let factors = ScoreFactors::new(1.0, 1.0, 1.0, 1.0, 1.0);
        let weights = ScoreWeights::new(0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(factors.composite(&weights), 0.0);
    }

    #[test]
    fn composite_clamps_to_unit_interval() {
        let factors = ScoreFactors::new(2.0, 2.0, 2.0, 2.0, 2.0);
        let weights = ScoreWeights::default();
        assert_eq!(factors.composite(&weights), 1.0);
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!((ScoreWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn history_gain_scales_only_route_history() {
        let weights = ScoreWeights::default().with_history_gain(0.5);
        assert!((weights.route_history - 0.075).abs() < 1e-9);
        assert!((weights.edge_quality - 0.35).abs() < 1e-9);
    }
}
