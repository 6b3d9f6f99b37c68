//! Position-sizing configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::RegimeTable;

/// Which sizing theory converts an admitted decision into a trade size.
///
/// Selected once per deployment; the orchestrator never switches policies
/// per decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SizingPolicyConfig {
    Kelly(KellyConfig),
    TargetUtility(TargetUtilityConfig),
}

impl Default for SizingPolicyConfig {
    fn default() -> Self {
        Self::Kelly(KellyConfig::default())
    }
}

/// Fractional Kelly with a ruin clip.
#[derive(Debug, Clone, Deserialize)]
pub struct KellyConfig {
    /// Fraction of full Kelly to bet (0.5 = half-Kelly).
    #[serde(default = "default_fractional_multiplier")]
    pub fractional_multiplier: f64,
    /// Confidence z-score for the ruin clip (1.645 ~ 95%).
    #[serde(default = "default_confidence_z")]
    pub confidence_z: f64,
    /// Loss at the confidence level may not exceed this fraction of equity.
    #[serde(default = "default_drawdown_bound")]
    pub drawdown_bound: f64,
}

const fn default_fractional_multiplier() -> f64 {
    0.5
}

const fn default_confidence_z() -> f64 {
    1.645
}

const fn default_drawdown_bound() -> f64 {
    0.10
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            fractional_multiplier: default_fractional_multiplier(),
            confidence_z: default_confidence_z(),
            drawdown_bound: default_drawdown_bound(),
        }
    }
}

/// Target-utility sizing: maximize the probability of reaching a wealth
/// target by a horizon. Deliberately more aggressive than Kelly.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetUtilityConfig {
    /// Wealth target to reach by the horizon.
    #[serde(default = "default_target_equity")]
    pub target_equity: Decimal,
    /// Horizon length in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Total attempt budget over the horizon.
    #[serde(default = "default_attempt_budget")]
    pub attempt_budget: u32,
    /// Upper bound on the behind-schedule aggression boost.
    #[serde(default = "default_max_aggression")]
    pub max_aggression: f64,
}

fn default_target_equity() -> Decimal {
    Decimal::from(20_000)
}

const fn default_horizon_days() -> u32 {
    30
}

const fn default_attempt_budget() -> u32 {
    500
}

const fn default_max_aggression() -> f64 {
    2.0
}

impl Default for TargetUtilityConfig {
    fn default() -> Self {
        Self {
            target_equity: default_target_equity(),
            horizon_days: default_horizon_days(),
            attempt_budget: default_attempt_budget(),
            max_aggression: default_max_aggression(),
        }
    }
}

/// Position-sizing configuration: policy selection, variance model,
/// regime scaling, and absolute bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// The sizing policy for this deployment.
    #[serde(default)]
    pub policy: SizingPolicyConfig,
    /// Baseline per-trade return volatility for the variance estimate.
    #[serde(default = "default_base_volatility")]
    pub base_volatility: f64,
    /// Floor on the variance estimate; keeps sizes finite on quiet routes.
    #[serde(default = "default_variance_floor")]
    pub variance_floor: f64,
    /// Sizing multiplier per regime bucket.
    #[serde(default = "default_regime_multiplier")]
    pub regime_multiplier: RegimeTable,
    /// Consecutive wins required before the streak boost applies.
    #[serde(default = "default_win_streak_len")]
    pub win_streak_len: u32,
    /// Multiplier applied after a win streak (bounded above 1).
    #[serde(default = "default_win_streak_boost")]
    pub win_streak_boost: f64,
    /// Absolute minimum trade size.
    #[serde(default = "default_min_size")]
    pub min_size: Decimal,
    /// Absolute maximum trade size.
    #[serde(default = "default_max_size")]
    pub max_size: Decimal,
    /// Hard cap as a fraction of equity; the recommended size never
    /// exceeds this regardless of scorer confidence.
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: Decimal,
}

const fn default_base_volatility() -> f64 {
    0.02
}

const fn default_variance_floor() -> f64 {
    1e-6
}

const fn default_regime_multiplier() -> RegimeTable {
    RegimeTable {
        bull_low: 1.0,
        bull_high: 0.6,
        bear_low: 0.8,
        bear_high: 0.4,
    }
}

const fn default_win_streak_len() -> u32 {
    3
}

const fn default_win_streak_boost() -> f64 {
    1.25
}

fn default_min_size() -> Decimal {
    Decimal::from(10)
}

fn default_max_size() -> Decimal {
    Decimal::from(5_000)
}

fn default_max_position_pct() -> Decimal {
    Decimal::new(2, 2) // 2% of equity
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            policy: SizingPolicyConfig::default(),
            base_volatility: default_base_volatility(),
            variance_floor: default_variance_floor(),
            regime_multiplier: default_regime_multiplier(),
            win_streak_len: default_win_streak_len(),
            win_streak_boost: default_win_streak_boost(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            max_position_pct: default_max_position_pct(),
        }
    }
}
