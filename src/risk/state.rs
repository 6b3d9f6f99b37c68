//! Mutable risk-accounting state.
//!
//! Owned exclusively by [`RiskManager`](super::RiskManager); every mutation
//! goes through its methods under a single lock so concurrent execution
//! completions never race on breaker or counter updates.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{BreakerConfig, RiskConfig};
use crate::domain::RouteId;

use super::breaker::{BreakerKind, CircuitBreaker};

/// Global breakers, in admission-check order.
pub(super) const GLOBAL_BREAKERS: [BreakerKind; 5] = [
    BreakerKind::MaxDrawdown,
    BreakerKind::MaxDailyLoss,
    BreakerKind::WinRateFloor,
    BreakerKind::ExecutionFailureRate,
    BreakerKind::VolatilitySpike,
];

/// Risk-accounting state.
pub(super) struct RiskState {
    pub equity: Decimal,
    pub peak_equity: Decimal,
    pub initial_equity: Decimal,
    pub daily_pnl: Decimal,
    pub daily_trade_count: u32,
    /// UTC day the daily counters belong to; counters reset lazily when
    /// the date changes.
    pub daily_date: NaiveDate,
    pub in_flight: u32,
    /// Trades dispatched over the lifetime of this state.
    pub total_trades: u64,
    /// When this risk state was created; anchors sizing schedules.
    pub started_at: DateTime<Utc>,
    /// Fatal ruin latch; cleared only by an external manual reset.
    pub halted: bool,
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    /// Rolling terminal outcomes (true = success) for rate breakers.
    pub outcome_window: VecDeque<bool>,
    /// Rolling realized pnl samples for the volatility breaker.
    pub pnl_window: VecDeque<f64>,
    pub global_breakers: Vec<CircuitBreaker>,
    pub route_breakers: HashMap<RouteId, CircuitBreaker>,
    pub route_failure_runs: HashMap<RouteId, u32>,
}

impl RiskState {
    pub fn new(config: &RiskConfig) -> Self {
        let global_breakers: Vec<CircuitBreaker> = GLOBAL_BREAKERS
            .iter()
            .map(|kind| CircuitBreaker::new(*kind, kind.label(), &config.breakers))
            .collect();

        Self {
            equity: config.initial_equity,
            peak_equity: config.initial_equity,
            initial_equity: config.initial_equity,
            daily_pnl: Decimal::ZERO,
            daily_trade_count: 0,
            daily_date: Utc::now().date_naive(),
            in_flight: 0,
            total_trades: 0,
            started_at: Utc::now(),
            halted: false,
            consecutive_wins: 0,
            consecutive_losses: 0,
            outcome_window: VecDeque::new(),
            pnl_window: VecDeque::new(),
            global_breakers,
            route_breakers: HashMap::new(),
            route_failure_runs: HashMap::new(),
        }
    }

    /// Reset daily counters when the UTC day has rolled over.
    pub fn maybe_reset_daily(&mut self, today: NaiveDate) {
        if today != self.daily_date {
            self.daily_date = today;
            self.daily_pnl = Decimal::ZERO;
            self.daily_trade_count = 0;
        }
    }

    /// The per-route consecutive-failures breaker, created on first use.
    pub fn route_breaker(
        &mut self,
        route: &RouteId,
        config: &BreakerConfig,
    ) -> &mut CircuitBreaker {
        self.route_breakers.entry(route.clone()).or_insert_with(|| {
            CircuitBreaker::new(
                BreakerKind::ConsecutiveFailures,
                format!("consecutive-failures:{route}"),
                config,
            )
        })
    }

    /// Drawdown from peak as a fraction of peak equity.
    pub fn drawdown_pct(&self) -> Decimal {
        if self.peak_equity.is_zero() {
            return Decimal::ZERO;
        }
        ((self.peak_equity - self.equity) / self.peak_equity).max(Decimal::ZERO)
    }

    /// Rolling success rate over the outcome window, if any samples.
    pub fn rolling_win_rate(&self) -> Option<f64> {
        if self.outcome_window.is_empty() {
            return None;
        }
        let wins = self.outcome_window.iter().filter(|w| **w).count();
        Some(wins as f64 / self.outcome_window.len() as f64)
    }

    /// Z-score of the latest pnl sample against the window.
    pub fn latest_pnl_z_score(&self) -> Option<f64> {
        let n = self.pnl_window.len();
        if n < 3 {
            return None;
        }
        let latest = *self.pnl_window.back()?;
        let mean = self.pnl_window.iter().sum::<f64>() / n as f64;
        let variance =
            self.pnl_window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        let std = variance.sqrt();
        if std <= f64::EPSILON {
            return None;
        }
        Some((latest - mean).abs() / std)
    }
}

/// Read-only view of risk state handed to the scorer and sizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskView {
    pub equity: Decimal,
    pub peak_equity: Decimal,
    pub initial_equity: Decimal,
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    pub total_trades: u64,
    pub started_at: DateTime<Utc>,
}

/// Serializable observability snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RiskSnapshot {
    pub equity: Decimal,
    pub peak_equity: Decimal,
    pub daily_pnl: Decimal,
    pub daily_trade_count: u32,
    pub in_flight: u32,
    pub halted: bool,
    /// Labels of breakers currently blocking admissions.
    pub open_breakers: Vec<String>,
}
