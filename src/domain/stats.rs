//! Per-route performance statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::execution::ExecutionRecord;
use super::id::RouteId;

/// Neutral prior used for routes with too little history.
pub const NEUTRAL_WIN_RATE: f64 = 0.5;
/// Neutral prior for profit capture on unseen routes.
pub const NEUTRAL_CAPTURE: f64 = 0.5;

/// Recency-weighted performance statistics for one route.
///
/// Owned exclusively by the `AdaptiveLearner`; everything else reads
/// snapshots. Mutated exactly once per terminal [`ExecutionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    /// Route these statistics describe.
    pub route: RouteId,
    /// EMA of success outcomes (1 = win, 0 = loss).
    pub win_rate: f64,
    /// EMA of the realized-to-predicted profit ratio.
    pub profit_capture: f64,
    /// Number of terminal records absorbed.
    pub sample_count: u64,
    /// Current run of consecutive wins.
    pub consecutive_wins: u32,
    /// Current run of consecutive losses.
    pub consecutive_losses: u32,
    /// Completion time of the most recent record.
    pub last_outcome_at: Option<DateTime<Utc>>,
}

impl RouteStats {
    /// Fresh statistics seeded with the neutral prior.
    #[must_use]
    pub fn new(route: RouteId) -> Self {
        Self {
            route,
            win_rate: NEUTRAL_WIN_RATE,
            profit_capture: NEUTRAL_CAPTURE,
            sample_count: 0,
            consecutive_wins: 0,
            consecutive_losses: 0,
            last_outcome_at: None,
        }
    }

    /// Absorb one terminal record with recency weight `alpha`:
    /// `new = old * (1 - alpha) + observed * alpha`.
    pub fn absorb(&mut self, record: &ExecutionRecord, alpha: f64) {
        let won = record.outcome.is_success();
        let observed_win = if won { 1.0 } else { 0.0 };

        self.win_rate = self.win_rate * (1.0 - alpha) + observed_win * alpha;
        self.profit_capture =
            self.profit_capture * (1.0 - alpha) + record.capture_ratio() * alpha;
        self.sample_count += 1;

        if won {
            self.consecutive_wins += 1;
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses += 1;
            self.consecutive_wins = 0;
        }
        self.last_outcome_at = Some(record.completed_at);
    }

    /// Blended history score in [0, 1] for the scorer's route-history
    /// factor.
    #[must_use]
    pub fn history_score(&self) -> f64 {
        (self.win_rate * 0.6 + self.profit_capture * 0.4).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::ExecutionOutcome;
    use crate::testkit::domain::record_for;
    use rust_decimal_macros::dec;

    #[test]
    fn new_stats_carry_neutral_prior() {
        let stats = RouteStats::new(RouteId::new("r"));
        assert_eq!(stats.win_rate, NEUTRAL_WIN_RATE);
        assert_eq!(stats.sample_count, 0);
    }

    #[test]
    fn absorb_moves_win_rate_toward_outcome() {
        let mut stats = RouteStats::new(RouteId::new("r"));
        let win = record_for("r", ExecutionOutcome::Success, dec!(10), dec!(10));
        stats.absorb(&win, 0.2);
        // 0.5 * 0.8 + 1.0 * 0.2 = 0.6
        assert!((stats.win_rate - 0.6).abs() < 1e-9);
        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.consecutive_wins, 1);
    }

    #[test]
    fn absorb_tracks_loss_streaks() {
        let mut stats = RouteStats::new(RouteId::new("r"));
        let loss = record_for("r", ExecutionOutcome::Failure, dec!(0), dec!(10));
        stats.absorb(&loss, 0.2);
        stats.absorb(&loss, 0.2);
        assert_eq!(stats.consecutive_losses, 2);
        assert_eq!(stats.consecutive_wins, 0);
    }

    #[test]
    fn win_resets_loss_streak() {
        let mut stats = RouteStats::new(RouteId::new("r"));
        let loss = record_for("r", ExecutionOutcome::Failure, dec!(0), dec!(10));
        let win = record_for("r", ExecutionOutcome::Success, dec!(10), dec!(10));
        stats.absorb(&loss, 0.2);
        stats.absorb(&win, 0.2);
        assert_eq!(stats.consecutive_losses, 0);
        assert_eq!(stats.consecutive_wins, 1);
    }

    #[test]
    fn history_score_stays_in_unit_interval() {
        let mut stats = RouteStats::new(RouteId::new("r"));
        stats.win_rate = 1.0;
        stats.profit_capture = 1.0;
        assert_eq!(stats.history_score(), 1.0);
    }
}
