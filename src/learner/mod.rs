//! Adaptive learning from execution outcomes.
//!
//! The learner owns per-route EMA statistics and a calibration gain that
//! scales the scorer's route-history factor. Every K terminal records it
//! runs a synchronous recalibration pass over the retained window; below
//! the minimum sample count the pass is a no-op and the scorer keeps its
//! neutral prior. Recalibration is a hook at the end of
//! [`AdaptiveLearner::record`], never a background task, so outcome
//! ordering stays deterministic.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::LearnerConfig;
use crate::domain::{ExecutionRecord, RouteId, RouteStats};

/// Read-mostly book of per-route statistics.
///
/// Mutation happens only inside [`AdaptiveLearner::record`]; everything
/// else takes snapshots.
#[derive(Default)]
pub struct RouteStatsBook {
    routes: RwLock<HashMap<RouteId, RouteStats>>,
}

impl RouteStatsBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one route's statistics.
    #[must_use]
    pub fn get(&self, route: &RouteId) -> Option<RouteStats> {
        self.routes.read().get(route).cloned()
    }

    /// Number of tracked routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }

    fn absorb(&self, record: &ExecutionRecord, alpha: f64) {
        let mut routes = self.routes.write();
        routes
            .entry(record.route.clone())
            .or_insert_with(|| RouteStats::new(record.route.clone()))
            .absorb(record, alpha);
    }
}

/// Calibration gain applied to the scorer's route-history weight.
pub struct Calibration {
    gain: RwLock<f64>,
}

impl Calibration {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            gain: RwLock::new(1.0),
        }
    }

    #[must_use]
    pub fn gain(&self) -> f64 {
        *self.gain.read()
    }

    fn set_gain(&self, gain: f64) {
        *self.gain.write() = gain;
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Online learner: EMA route statistics plus periodic recalibration.
pub struct AdaptiveLearner {
    config: LearnerConfig,
    stats: Arc<RouteStatsBook>,
    calibration: Arc<Calibration>,
    /// Recent terminal records and the record counter, updated together.
    window: Mutex<LearnerWindow>,
}

struct LearnerWindow {
    recent: VecDeque<ExecutionRecord>,
    recorded: u64,
}

impl AdaptiveLearner {
    #[must_use]
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            config,
            stats: Arc::new(RouteStatsBook::new()),
            calibration: Arc::new(Calibration::neutral()),
            window: Mutex::new(LearnerWindow {
                recent: VecDeque::new(),
                recorded: 0,
            }),
        }
    }

    /// Shared handle to the route statistics book.
    #[must_use]
    pub fn stats(&self) -> Arc<RouteStatsBook> {
        Arc::clone(&self.stats)
    }

    /// Shared handle to the calibration gain.
    #[must_use]
    pub fn calibration(&self) -> Arc<Calibration> {
        Arc::clone(&self.calibration)
    }

    /// Absorb one terminal record. Exactly one call per record; the
    /// orchestrator invokes this before `RiskManager::update`.
    pub fn record(&self, record: &ExecutionRecord) {
        self.stats.absorb(record, self.config.alpha);

        let due = {
            let mut window = self.window.lock();
            window.recent.push_back(record.clone());
            while window.recent.len() > self.config.window {
                window.recent.pop_front();
            }
            window.recorded += 1;
            window.recorded % self.config.recalibration_interval == 0
        };

        if due {
            self.recalibrate();
        }
    }

    /// Refresh the route-history calibration gain from the retained
    /// window. No-op below the minimum sample count.
    fn recalibrate(&self) {
        let window = self.window.lock();
        if window.recent.len() < self.config.min_recalibration_samples {
            debug!(
                samples = window.recent.len(),
                min = self.config.min_recalibration_samples,
                "Recalibration skipped, insufficient samples"
            );
            return;
        }

        // How well did route history predict outcomes? Compare each
        // record against its route's current win-rate estimate: skill is
        // the mean agreement, mapped onto the configured gain band.
        let mut agreement = 0.0;
        for record in &window.recent {
            let win_rate = self
                .stats
                .get(&record.route)
                .map_or(crate::domain::stats::NEUTRAL_WIN_RATE, |s| s.win_rate);
            let outcome = if record.outcome.is_success() { 1.0 } else { 0.0 };
            agreement += 1.0 - (outcome - win_rate).abs();
        }
        agreement /= window.recent.len() as f64;

        // agreement 0.5 is chance level -> neutral gain 1.0.
        let gain = (2.0 * agreement).clamp(self.config.min_gain, self.config.max_gain);
        self.calibration.set_gain(gain);
        info!(
            samples = window.recent.len(),
            agreement, gain, "Recalibrated route-history gain"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionOutcome;
    use crate::testkit::domain::record_for;
    use rust_decimal_macros::dec;

    fn learner(config: LearnerConfig) -> AdaptiveLearner {
        AdaptiveLearner::new(config)
    }

    #[test]
    fn record_updates_route_stats_once() {
        let l = learner(LearnerConfig::default());
        let r = record_for("r1", ExecutionOutcome::Success, dec!(10), dec!(10));
        l.record(&r);

        let stats = l.stats().get(&RouteId::new("r1")).unwrap();
        assert_eq!(stats.sample_count, 1);
        // 0.5 * 0.85 + 1.0 * 0.15
        assert!((stats.win_rate - 0.575).abs() < 1e-9);
    }

    #[test]
    fn unknown_route_has_no_stats() {
        let l = learner(LearnerConfig::default());
        assert!(l.stats().get(&RouteId::new("nope")).is_none());
    }

    #[test]
    fn recalibration_noop_below_min_samples() {
        let config = LearnerConfig {
            recalibration_interval: 5,
            min_recalibration_samples: 50,
            ..Default::default()
        };
        let l = learner(config);
        let r = record_for("r1", ExecutionOutcome::Success, dec!(10), dec!(10));
        for _ in 0..10 {
            l.record(&r);
        }
        assert_eq!(l.calibration().gain(), 1.0);
    }

    #[test]
    fn recalibration_raises_gain_for_predictable_routes() {
        let config = LearnerConfig {
            recalibration_interval: 10,
            min_recalibration_samples: 10,
            window: 100,
            ..Default::default()
        };
        let l = learner(config);
        // A consistently winning route: history predicts outcomes well.
        let win = record_for("r1", ExecutionOutcome::Success, dec!(10), dec!(10));
        for _ in 0..30 {
            l.record(&win);
        }
        assert!(l.calibration().gain() > 1.0);
    }

    #[test]
    fn recalibration_gain_is_bounded() {
        let config = LearnerConfig {
            recalibration_interval: 10,
            min_recalibration_samples: 10,
            window: 100,
            min_gain: 0.5,
            max_gain: 1.5,
            ..Default::default()
        };
        let l = learner(config.clone());
        let win = record_for("r1", ExecutionOutcome::Success, dec!(10), dec!(10));
        for _ in 0..100 {
            l.record(&win);
        }
        assert!(l.calibration().gain() <= config.max_gain);

        // Alternating outcomes: agreement hovers near chance, gain near 1.
        let l2 = learner(config.clone());
        let loss = record_for("r2", ExecutionOutcome::Failure, dec!(0), dec!(10));
        let win2 = record_for("r2", ExecutionOutcome::Success, dec!(10), dec!(10));
        for i in 0..100 {
            if i % 2 == 0 {
                l2.record(&win2);
            } else {
                l2.record(&loss);
            }
        }
        let gain = l2.calibration().gain();
        assert!(gain >= config.min_gain && gain <= config.max_gain);
    }

    #[test]
    fn window_is_bounded() {
        let config = LearnerConfig {
            window: 10,
            recalibration_interval: 1000,
            ..Default::default()
        };
        let l = learner(config);
        let r = record_for("r1", ExecutionOutcome::Success, dec!(10), dec!(10));
        for _ in 0..50 {
            l.record(&r);
        }
        assert_eq!(l.window.lock().recent.len(), 10);
    }
}
