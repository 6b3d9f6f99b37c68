//! Position sizing: converts an admitted decision into a bounded trade
//! size.
//!
//! Two interchangeable theories (fractional Kelly with a ruin clip, and
//! target-utility) are selected once at configuration time. Whatever the
//! policy produces passes through the regime multiplier, a bounded
//! win-streak boost, absolute size bounds, and finally the hard cap: the
//! recommendation never exceeds `max_position_pct * equity`.

mod kelly;
mod target_utility;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{SizingConfig, SizingPolicyConfig};
use crate::domain::{MarketRegime, ScoredDecision, BPS_SCALE};
use crate::risk::RiskView;

/// Position sizer with a deployment-fixed policy.
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    #[must_use]
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    /// Name of the active policy, for logging.
    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        match self.config.policy {
            SizingPolicyConfig::Kelly(_) => "kelly",
            SizingPolicyConfig::TargetUtility(_) => "target_utility",
        }
    }

    /// Recommended trade size for an admitted decision.
    ///
    /// Always within `[0, max_position_pct * equity]` for any edge or
    /// variance magnitude.
    #[must_use]
    pub fn size(
        &self,
        decision: &ScoredDecision,
        regime: MarketRegime,
        view: &RiskView,
    ) -> Decimal {
        let edge = (decision.candidate.net_edge_bps() / BPS_SCALE)
            .to_f64()
            .unwrap_or(0.0);
        if edge <= 0.0 {
            return Decimal::ZERO;
        }
        let variance = self.variance_estimate(decision);

        let raw_fraction = match &self.config.policy {
            SizingPolicyConfig::Kelly(kelly_config) => {
                kelly::fraction(edge, variance, kelly_config)
            }
            SizingPolicyConfig::TargetUtility(target_config) => {
                target_utility::fraction(edge, variance, view, Utc::now(), target_config)
            }
        };

        let mut fraction = raw_fraction * self.config.regime_multiplier.get(regime);
        if view.consecutive_wins >= self.config.win_streak_len {
            fraction *= self.config.win_streak_boost;
        }

        let equity = view.equity.max(Decimal::ZERO);
        let size = equity * Decimal::try_from(fraction.max(0.0)).unwrap_or(Decimal::ZERO);

        let bounded = size
            .clamp(self.config.min_size, self.config.max_size)
            .min(self.config.max_position_pct * equity)
            .max(Decimal::ZERO);

        debug!(
            decision = %decision.id,
            policy = self.policy_name(),
            fraction = raw_fraction,
            size = %bounded,
            "Sized decision"
        );
        bounded
    }

    /// Per-decision return variance: the configured baseline widened by
    /// predicted failure probability and route hops.
    fn variance_estimate(&self, decision: &ScoredDecision) -> f64 {
        let failure = 1.0 - decision.success_probability.clamp(0.0, 1.0);
        let hop_penalty = 1.0 + 0.25 * f64::from(decision.candidate.hops.saturating_sub(1));
        let sigma = self.config.base_volatility * (1.0 + failure) * hop_penalty;
        (sigma * sigma).max(self.config.variance_floor)
    }
}
