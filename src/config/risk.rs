//! Risk management configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Circuit breaker thresholds and cooldown schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    /// Rolling win rate below this trips the win-rate breaker.
    #[serde(default = "default_win_rate_floor")]
    pub win_rate_floor: f64,
    /// Window length (terminal records) for rate-based breakers.
    #[serde(default = "default_rate_window")]
    pub rate_window: usize,
    /// Minimum samples in the window before rate breakers can trip.
    #[serde(default = "default_rate_min_samples")]
    pub rate_min_samples: usize,
    /// Drawdown from peak equity that trips the drawdown breaker.
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,
    /// Daily realized loss that trips the daily-loss breaker.
    #[serde(default = "default_max_daily_loss")]
    pub max_daily_loss: Decimal,
    /// Consecutive failures on one route that trip its breaker.
    #[serde(default = "default_consecutive_failures")]
    pub consecutive_failures: u32,
    /// Volatility z-score above which the volatility breaker trips.
    #[serde(default = "default_volatility_z")]
    pub volatility_z: f64,
    /// Execution failure rate (timeouts included) that trips the
    /// failure-rate breaker.
    #[serde(default = "default_failure_rate_limit")]
    pub failure_rate_limit: f64,
    /// First cooldown after a trip, in seconds.
    #[serde(default = "default_base_cooldown_secs")]
    pub base_cooldown_secs: u64,
    /// Cooldown multiplier per repeated trip.
    #[serde(default = "default_cooldown_multiplier")]
    pub cooldown_multiplier: f64,
    /// Cap on the escalated cooldown, in seconds.
    #[serde(default = "default_max_cooldown_secs")]
    pub max_cooldown_secs: u64,
}

const fn default_win_rate_floor() -> f64 {
    0.35
}

const fn default_rate_window() -> usize {
    50
}

const fn default_rate_min_samples() -> usize {
    10
}

fn default_max_drawdown_pct() -> Decimal {
    Decimal::new(15, 2) // 15%
}

fn default_max_daily_loss() -> Decimal {
    Decimal::from(500)
}

const fn default_consecutive_failures() -> u32 {
    5
}

const fn default_volatility_z() -> f64 {
    3.0
}

const fn default_failure_rate_limit() -> f64 {
    0.5
}

const fn default_base_cooldown_secs() -> u64 {
    60
}

const fn default_cooldown_multiplier() -> f64 {
    2.0
}

const fn default_max_cooldown_secs() -> u64 {
    3600
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            win_rate_floor: default_win_rate_floor(),
            rate_window: default_rate_window(),
            rate_min_samples: default_rate_min_samples(),
            max_drawdown_pct: default_max_drawdown_pct(),
            max_daily_loss: default_max_daily_loss(),
            consecutive_failures: default_consecutive_failures(),
            volatility_z: default_volatility_z(),
            failure_rate_limit: default_failure_rate_limit(),
            base_cooldown_secs: default_base_cooldown_secs(),
            cooldown_multiplier: default_cooldown_multiplier(),
            max_cooldown_secs: default_max_cooldown_secs(),
        }
    }
}

/// Risk management configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Starting account equity.
    #[serde(default = "default_initial_equity")]
    pub initial_equity: Decimal,
    /// Equity below this halts all admissions pending manual reset.
    #[serde(default = "default_ruin_floor")]
    pub ruin_floor: Decimal,
    /// Maximum trades admitted per UTC day.
    #[serde(default = "default_daily_trade_cap")]
    pub daily_trade_cap: u32,
    /// Circuit breaker thresholds.
    #[serde(default)]
    pub breakers: BreakerConfig,
}

fn default_initial_equity() -> Decimal {
    Decimal::from(10_000)
}

fn default_ruin_floor() -> Decimal {
    Decimal::from(2_000)
}

const fn default_daily_trade_cap() -> u32 {
    200
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            initial_equity: default_initial_equity(),
            ruin_floor: default_ruin_floor(),
            daily_trade_cap: default_daily_trade_cap(),
            breakers: BreakerConfig::default(),
        }
    }
}
