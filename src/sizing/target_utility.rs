//! Target-utility sizing.
//!
//! Sizes toward a fixed wealth target within a horizon: computes the
//! per-attempt growth needed to reach the target over the remaining
//! attempt budget, converts it to a bet fraction via the edge, and boosts
//! the fraction (bounded) when realized wealth lags the geometric
//! schedule implied by the horizon. Floored at full Kelly, so it always
//! tolerates more ruin risk than the Kelly policy.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;

use crate::config::TargetUtilityConfig;
use crate::risk::RiskView;

/// Target-utility bet fraction.
#[must_use]
pub fn fraction(
    edge: f64,
    variance: f64,
    view: &RiskView,
    now: DateTime<Utc>,
    config: &TargetUtilityConfig,
) -> f64 {
    if edge <= 0.0 || variance <= 0.0 {
        return 0.0;
    }

    let wealth = view.equity.to_f64().unwrap_or(0.0);
    let start = view.initial_equity.to_f64().unwrap_or(0.0);
    let target = config.target_equity.to_f64().unwrap_or(0.0);
    if wealth <= 0.0 || start <= 0.0 || target <= 0.0 {
        return 0.0;
    }

    let remaining = config
        .attempt_budget
        .saturating_sub(view.total_trades.min(u64::from(u32::MAX)) as u32)
        .max(1);

    // Growth per remaining attempt needed to reach the target.
    let needed = (target / wealth).max(1.0);
    let growth_per_attempt = needed.powf(1.0 / f64::from(remaining)) - 1.0;

    // A win moves wealth by edge * fraction, so the fraction that keeps
    // the schedule is growth / edge.
    let mut f = growth_per_attempt / edge;

    // Full Kelly floor: strictly more aggressive than the fractional,
    // ruin-clipped Kelly policy.
    f = f.max(edge / variance);

    f * schedule_boost(wealth, start, target, view.started_at, now, config)
}

/// Boost applied when wealth lags the geometric schedule. 1.0 when on or
/// ahead of schedule, capped at `max_aggression` when far behind.
fn schedule_boost(
    wealth: f64,
    start: f64,
    target: f64,
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &TargetUtilityConfig,
) -> f64 {
    if target <= start {
        return 1.0;
    }
    let horizon_secs = f64::from(config.horizon_days) * 86_400.0;
    if horizon_secs <= 0.0 {
        return 1.0;
    }
    let elapsed = (now - started_at).num_seconds().max(0) as f64;
    let progress = (elapsed / horizon_secs).clamp(0.0, 1.0);

    // Where wealth should be by now on the geometric path to the target.
    let scheduled = start * (target / start).powf(progress);
    if wealth >= scheduled {
        return 1.0;
    }
    (scheduled / wealth).min(config.max_aggression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn view(equity: rust_decimal::Decimal) -> RiskView {
        RiskView {
            equity,
            peak_equity: equity,
            initial_equity: dec!(10_000),
            consecutive_wins: 0,
            consecutive_losses: 0,
            total_trades: 0,
            started_at: Utc::now(),
        }
    }

    fn config() -> TargetUtilityConfig {
        TargetUtilityConfig {
            target_equity: dec!(20_000),
            horizon_days: 30,
            attempt_budget: 500,
            max_aggression: 2.0,
        }
    }

    #[test]
    fn zero_for_non_positive_edge() {
        let v = view(dec!(10_000));
        assert_eq!(fraction(0.0, 0.01, &v, Utc::now(), &config()), 0.0);
    }

    #[test]
    fn at_least_full_kelly() {
        let v = view(dec!(10_000));
        let edge = 0.004;
        let variance = 0.01;
        let f = fraction(edge, variance, &v, Utc::now(), &config());
        assert!(f >= edge / variance);
    }

    #[test]
    fn behind_schedule_sizes_larger() {
        let cfg = config();
        let v = view(dec!(10_000));
        // Half the horizon elapsed with no progress toward the target.
        let later = v.started_at + Duration::days(15);
        let on_time = fraction(0.004, 0.01, &v, v.started_at, &cfg);
        let behind = fraction(0.004, 0.01, &v, later, &cfg);
        assert!(behind > on_time);
    }

    #[test]
    fn boost_is_capped() {
        let cfg = config();
        let v = view(dec!(1_000));
        let later = v.started_at + Duration::days(29);
        let boosted = fraction(0.004, 0.01, &v, later, &cfg);
        let unboosted = fraction(0.004, 0.01, &v, v.started_at, &cfg);
        assert!(boosted <= unboosted * cfg.max_aggression + 1e-9);
    }

    #[test]
    fn ahead_of_schedule_has_no_boost() {
        let cfg = config();
        let v = view(dec!(25_000));
        let later = v.started_at + Duration::days(20);
        let f_now = fraction(0.004, 0.01, &v, v.started_at, &cfg);
        let f_later = fraction(0.004, 0.01, &v, later, &cfg);
        assert!((f_now - f_later).abs() < 1e-9);
    }
}
