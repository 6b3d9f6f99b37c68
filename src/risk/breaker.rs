//! Circuit breaker state machines.
//!
//! Each breaker is independent: Closed -> (trigger) -> Open with a
//! cooldown that backs off exponentially across repeated trips, capped ->
//! (cooldown elapsed) -> HalfOpen -> one trial admission decides Closed
//! (success, backoff reset) or Open again with a longer cooldown.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::BreakerConfig;
use crate::error::RiskError;

/// Trigger category a breaker guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakerKind {
    /// Rolling win rate fell below the configured floor.
    WinRateFloor,
    /// Drawdown from peak equity exceeded the limit.
    MaxDrawdown,
    /// Realized daily loss reached the cap.
    MaxDailyLoss,
    /// Consecutive failures on a single route.
    ConsecutiveFailures,
    /// Realized pnl volatility spiked beyond the z-score threshold.
    VolatilitySpike,
    /// Rolling execution failure rate (timeouts included) too high.
    ExecutionFailureRate,
}

impl BreakerKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WinRateFloor => "win-rate-floor",
            Self::MaxDrawdown => "max-drawdown",
            Self::MaxDailyLoss => "max-daily-loss",
            Self::ConsecutiveFailures => "consecutive-failures",
            Self::VolatilitySpike => "volatility-spike",
            Self::ExecutionFailureRate => "execution-failure-rate",
        }
    }
}

impl fmt::Display for BreakerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breaker admission states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation, admissions allowed.
    Closed,
    /// Blocking all admissions in this category until the cooldown ends.
    Open { until: Instant },
    /// Cooldown elapsed; exactly one trial admission is permitted.
    HalfOpen { trial_in_flight: bool },
}

/// One independent circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    id: String,
    kind: BreakerKind,
    state: BreakerState,
    /// Trips since the last full recovery; drives cooldown escalation.
    trip_count: u32,
    base_cooldown: Duration,
    cooldown_multiplier: f64,
    max_cooldown: Duration,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(kind: BreakerKind, id: impl Into<String>, config: &BreakerConfig) -> Self {
        Self {
            id: id.into(),
            kind,
            state: BreakerState::Closed,
            trip_count: 0,
            base_cooldown: Duration::from_secs(config.base_cooldown_secs),
            cooldown_multiplier: config.cooldown_multiplier,
            max_cooldown: Duration::from_secs(config.max_cooldown_secs),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> BreakerKind {
        self.kind
    }

    #[must_use]
    pub const fn state(&self) -> BreakerState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, BreakerState::Open { .. })
    }

    /// Cooldown for the next trip: `base * multiplier^trips`, capped.
    fn next_cooldown(&self) -> Duration {
        let factor = self.cooldown_multiplier.powi(self.trip_count as i32);
        let millis = (self.base_cooldown.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_cooldown)
    }

    /// Advance Open -> HalfOpen once the cooldown has elapsed.
    pub fn poll(&mut self, now: Instant) {
        if let BreakerState::Open { until } = self.state {
            if now >= until {
                debug!(breaker = %self.id, "Cooldown elapsed, entering half-open");
                self.state = BreakerState::HalfOpen {
                    trial_in_flight: false,
                };
            }
        }
    }

    /// Whether an admission would pass right now, without mutating state.
    pub fn peek_admit(&mut self, now: Instant) -> Result<(), RiskError> {
        self.poll(now);
        match self.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open { .. } => Err(RiskError::BreakerOpen {
                breaker: self.id.clone(),
            }),
            BreakerState::HalfOpen { trial_in_flight } => {
                if trial_in_flight {
                    Err(RiskError::TrialPending {
                        breaker: self.id.clone(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Commit the admission that `peek_admit` approved. In HalfOpen this
    /// consumes the single trial slot.
    pub fn commit_admit(&mut self) {
        if let BreakerState::HalfOpen { trial_in_flight } = &mut self.state {
            *trial_in_flight = true;
        }
    }

    /// Trip the breaker open, escalating the cooldown.
    pub fn trip(&mut self, now: Instant, reason: &str) {
        let cooldown = self.next_cooldown();
        self.trip_count += 1;
        self.state = BreakerState::Open {
            until: now + cooldown,
        };
        warn!(
            breaker = %self.id,
            kind = %self.kind,
            trip = self.trip_count,
            cooldown_secs = cooldown.as_secs(),
            reason,
            "Circuit breaker tripped"
        );
    }

    /// True when a half-open trial is pending resolution.
    #[must_use]
    pub const fn trial_pending(&self) -> bool {
        matches!(
            self.state,
            BreakerState::HalfOpen {
                trial_in_flight: true
            }
        )
    }

    /// Resolve the pending half-open trial. Success closes the breaker
    /// and resets the backoff; failure reopens it with a longer cooldown.
    pub fn resolve_trial(&mut self, success: bool, now: Instant) {
        if !self.trial_pending() {
            return;
        }
        if success {
            debug!(breaker = %self.id, "Trial succeeded, breaker closed");
            self.state = BreakerState::Closed;
            self.trip_count = 0;
        } else {
            self.trip(now, "half-open trial failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_secs: u64) -> BreakerConfig {
        BreakerConfig {
            base_cooldown_secs: base_secs,
            cooldown_multiplier: 2.0,
            max_cooldown_secs: 3600,
            ..Default::default()
        }
    }

    fn breaker(base_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(BreakerKind::MaxDrawdown, "max-drawdown", &config(base_secs))
    }

    #[test]
    fn closed_admits() {
        let mut b = breaker(60);
        assert!(b.peek_admit(Instant::now()).is_ok());
    }

    #[test]
    fn open_blocks_until_cooldown() {
        let mut b = breaker(60);
        let now = Instant::now();
        b.trip(now, "test");
        assert!(matches!(
            b.peek_admit(now),
            Err(RiskError::BreakerOpen { .. })
        ));
        // Still blocked just before the cooldown ends.
        assert!(b
            .peek_admit(now + Duration::from_secs(59))
            .is_err());
    }

    #[test]
    fn open_transitions_to_half_open_after_cooldown() {
        let mut b = breaker(60);
        let now = Instant::now();
        b.trip(now, "test");
        assert!(b.peek_admit(now + Duration::from_secs(61)).is_ok());
        assert!(matches!(
            b.state(),
            BreakerState::HalfOpen {
                trial_in_flight: false
            }
        ));
    }

    #[test]
    fn half_open_admits_exactly_one_trial() {
        let mut b = breaker(0);
        let now = Instant::now();
        b.trip(now, "test");
        let later = now + Duration::from_millis(1);

        assert!(b.peek_admit(later).is_ok());
        b.commit_admit();
        assert!(matches!(
            b.peek_admit(later),
            Err(RiskError::TrialPending { .. })
        ));
    }

    #[test]
    fn successful_trial_closes_and_resets_backoff() {
        let mut b = breaker(60);
        let now = Instant::now();
        b.trip(now, "test");
        b.poll(now + Duration::from_secs(61));
        b.commit_admit();
        b.resolve_trial(true, now);

        assert_eq!(b.state(), BreakerState::Closed);
        // Backoff reset: the next trip gets the base cooldown again.
        b.trip(now, "again");
        if let BreakerState::Open { until } = b.state() {
            assert_eq!(until - now, Duration::from_secs(60));
        } else {
            panic!("expected open");
        }
    }

    #[test]
    fn failed_trial_reopens_with_longer_cooldown() {
        let mut b = breaker(60);
        let now = Instant::now();
        b.trip(now, "test");
        b.poll(now + Duration::from_secs(61));
        b.commit_admit();
        b.resolve_trial(false, now);

        if let BreakerState::Open { until } = b.state() {
            // Second trip: 60 * 2^1 = 120s.
            assert_eq!(until - now, Duration::from_secs(120));
        } else {
            panic!("expected open");
        }
    }

    #[test]
    fn cooldown_escalation_is_capped() {
        let mut config = config(1800);
        config.max_cooldown_secs = 2000;
        let mut b = CircuitBreaker::new(BreakerKind::MaxDailyLoss, "max-daily-loss", &config);
        let now = Instant::now();
        b.trip(now, "one");
        b.state = BreakerState::HalfOpen {
            trial_in_flight: true,
        };
        b.resolve_trial(false, now);

        if let BreakerState::Open { until } = b.state() {
            // 1800 * 2 = 3600, capped at 2000.
            assert_eq!(until - now, Duration::from_secs(2000));
        } else {
            panic!("expected open");
        }
    }

    #[test]
    fn resolve_without_trial_is_noop() {
        let mut b = breaker(60);
        b.resolve_trial(false, Instant::now());
        assert_eq!(b.state(), BreakerState::Closed);
    }
}
