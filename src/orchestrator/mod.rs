//! Central decision loop: batches candidates, consults the scorer, risk
//! gate, and sizer, and dispatches admitted decisions to the execution
//! backend under bounded concurrency with per-route cooldowns.
//!
//! The tick itself never suspends; only backend executions do. Each
//! dispatched execution owns a semaphore permit that is released exactly
//! once on every exit path (success, failure, timeout, panic), and its
//! terminal record feeds the learner first, then the risk manager.

mod backend;
mod telemetry;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::config::{Config, OrchestratorConfig};
use crate::domain::{
    Candidate, DispatchResult, ExecutionOutcome, ExecutionRecord, MarketRegime, RouteId,
    ScoredDecision,
};
use crate::error::Result;
use crate::learner::AdaptiveLearner;
use crate::risk::{RiskManager, RiskSnapshot};
use crate::scorer::Scorer;
use crate::sizing::PositionSizer;

pub use backend::{ExecutionBackend, PaperBackend};
pub use telemetry::{Telemetry, TelemetrySnapshot};

/// Immutable per-tick view of the reloadable components.
struct TickSnapshot {
    scorer: Scorer,
    sizer: PositionSizer,
    config: OrchestratorConfig,
}

/// Combined observability snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub telemetry: TelemetrySnapshot,
    pub risk: RiskSnapshot,
}

/// The central decision and dispatch loop.
pub struct Orchestrator {
    snapshot: RwLock<Arc<TickSnapshot>>,
    regime: RwLock<MarketRegime>,
    risk: Arc<RiskManager>,
    learner: Arc<AdaptiveLearner>,
    backend: Arc<dyn ExecutionBackend>,
    telemetry: Arc<Telemetry>,
    cooldowns: DashMap<RouteId, Instant>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    dry_run: bool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: &Config, backend: Arc<dyn ExecutionBackend>) -> Self {
        let learner = Arc::new(AdaptiveLearner::new(config.learner.clone()));
        let scorer = Scorer::new(
            config.scorer.clone(),
            learner.stats(),
            learner.calibration(),
        );
        let sizer = PositionSizer::new(config.sizing.clone());
        let risk = Arc::new(RiskManager::new(config));
        let max_concurrent = config.orchestrator.max_concurrent;

        info!(
            backend = backend.name(),
            policy = sizer.policy_name(),
            max_concurrent,
            dry_run = config.dry_run,
            "Orchestrator initialized"
        );

        Self {
            snapshot: RwLock::new(Arc::new(TickSnapshot {
                scorer,
                sizer,
                config: config.orchestrator.clone(),
            })),
            regime: RwLock::new(MarketRegime::default()),
            risk,
            learner,
            backend,
            telemetry: Arc::new(Telemetry::new()),
            cooldowns: DashMap::new(),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            dry_run: config.dry_run,
        }
    }

    /// Swap in a new configuration snapshot between ticks.
    ///
    /// Scorer weights, sizing policy, and loop knobs take effect on the
    /// next tick; route statistics and calibration survive the swap. The
    /// concurrency limit is fixed at startup.
    pub fn reload(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let scorer = Scorer::new(
            config.scorer.clone(),
            self.learner.stats(),
            self.learner.calibration(),
        );
        let sizer = PositionSizer::new(config.sizing.clone());
        *self.snapshot.write() = Arc::new(TickSnapshot {
            scorer,
            sizer,
            config: config.orchestrator.clone(),
        });
        info!("Configuration reloaded");
        Ok(())
    }

    /// Update the externally supplied market-regime label.
    pub fn set_regime(&self, regime: MarketRegime) {
        *self.regime.write() = regime;
    }

    #[must_use]
    pub fn risk(&self) -> &Arc<RiskManager> {
        &self.risk
    }

    #[must_use]
    pub fn learner(&self) -> &Arc<AdaptiveLearner> {
        &self.learner
    }

    #[must_use]
    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    /// Current observability snapshot.
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        let in_flight = (self.max_concurrent - self.semaphore.available_permits()) as u64;
        StatusSnapshot {
            telemetry: self.telemetry.snapshot(in_flight),
            risk: self.risk.snapshot(),
        }
    }

    /// Process one batch of candidates.
    ///
    /// Synchronous and non-blocking: admitted decisions are dispatched to
    /// the backend on spawned tasks and their outcomes arrive via the
    /// learner/risk updates in completion order. In dry-run mode admitted
    /// decisions are logged and counted but never dispatched.
    pub fn tick(&self, candidates: Vec<Candidate>) -> Vec<DispatchResult> {
        let snapshot = Arc::clone(&self.snapshot.read());
        let regime = *self.regime.read();
        let mut results = Vec::with_capacity(candidates.len().min(snapshot.config.max_batch));

        // Drain up to the batch bound, dropping malformed candidates.
        let mut batch = Vec::with_capacity(snapshot.config.max_batch);
        for candidate in candidates {
            if batch.len() >= snapshot.config.max_batch {
                break;
            }
            match candidate.validate() {
                Ok(()) => batch.push(candidate),
                Err(e) => {
                    self.telemetry.incr_dropped_malformed();
                    debug!(error = %e, "Dropped malformed candidate");
                    results.push(DispatchResult::Dropped);
                }
            }
        }

        let decisions = snapshot.scorer.rank(&batch, regime);

        let mut failed_attempts = 0usize;
        for decision in decisions {
            let route = decision.route.clone();

            if !decision.is_admissible() {
                self.telemetry.incr_rejected_by_scorer();
                results.push(DispatchResult::RejectedByScorer { route });
                continue;
            }

            // Bounded fallback: stop walking the ranked tail once this
            // tick has burned its admission attempts.
            if failed_attempts >= snapshot.config.max_admission_attempts {
                self.telemetry.incr_deferred();
                results.push(DispatchResult::Deferred { route });
                continue;
            }

            let cooldown = Duration::from_secs(snapshot.config.cooldown_seconds);
            if self.in_cooldown(&route, cooldown) {
                self.telemetry.incr_rejected_by_cooldown();
                debug!(route = %route, "Route in cooldown");
                results.push(DispatchResult::RejectedByCooldown { route });
                failed_attempts += 1;
                continue;
            }

            let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() else {
                self.telemetry.incr_rejected_by_concurrency();
                results.push(DispatchResult::RejectedByConcurrency { route });
                failed_attempts += 1;
                continue;
            };

            let view = self.risk.view();
            let size = snapshot.sizer.size(&decision, regime, &view);
            if size <= Decimal::ZERO {
                self.telemetry.incr_rejected_by_scorer();
                results.push(DispatchResult::RejectedByScorer { route });
                failed_attempts += 1;
                continue;
            }
            if let Err(e) = self.risk.check_hard_limits(size) {
                self.telemetry.incr_rejected_by_breaker();
                results.push(DispatchResult::RejectedByRisk {
                    route,
                    reason: e.to_string(),
                });
                failed_attempts += 1;
                continue;
            }

            // The gate goes last: passing it consumes half-open trial
            // slots, so nothing rejected after this point.
            if let Err(e) = self.risk.can_admit(&route) {
                self.telemetry.incr_rejected_by_breaker();
                debug!(route = %route, reason = %e, "Risk gate rejected");
                results.push(DispatchResult::RejectedByRisk {
                    route,
                    reason: e.to_string(),
                });
                failed_attempts += 1;
                continue;
            }

            self.cooldowns.insert(route.clone(), Instant::now());
            self.telemetry.incr_admitted();

            if self.dry_run {
                info!(
                    decision = %decision.id,
                    route = %route,
                    %size,
                    "Dry-run: would execute"
                );
                results.push(DispatchResult::Dispatched {
                    decision_id: decision.id.clone(),
                    route,
                });
                continue;
            }

            self.risk.begin_execution();
            results.push(DispatchResult::Dispatched {
                decision_id: decision.id.clone(),
                route,
            });
            self.dispatch(decision, size, &snapshot.config, permit);
        }

        results
    }

    /// True when the route dispatched within the cooldown window.
    fn in_cooldown(&self, route: &RouteId, cooldown: Duration) -> bool {
        self.cooldowns
            .get(route)
            .is_some_and(|last| last.elapsed() < cooldown)
    }

    /// Spawn the execution without blocking the tick loop.
    fn dispatch(
        &self,
        decision: ScoredDecision,
        size: Decimal,
        config: &OrchestratorConfig,
        permit: OwnedSemaphorePermit,
    ) {
        let backend = Arc::clone(&self.backend);
        let learner = Arc::clone(&self.learner);
        let risk = Arc::clone(&self.risk);
        let telemetry = Arc::clone(&self.telemetry);
        let timeout = Duration::from_secs(config.execution_timeout_secs);

        tokio::spawn(async move {
            let started = Instant::now();
            let call_decision = decision.clone();
            let mut handle = tokio::spawn(async move {
                backend.execute(&call_decision, size).await
            });

            let (outcome, profit, cost) =
                match tokio::time::timeout(timeout, &mut handle).await {
                    Ok(Ok(Ok(report))) => {
                        let outcome = if report.success {
                            ExecutionOutcome::Success
                        } else {
                            ExecutionOutcome::Failure
                        };
                        (outcome, report.actual_profit, report.actual_cost)
                    }
                    Ok(Ok(Err(error))) => {
                        debug!(decision = %decision.id, error = %error, "Backend error");
                        (ExecutionOutcome::Failure, Decimal::ZERO, Decimal::ZERO)
                    }
                    Ok(Err(join_error)) => {
                        warn!(decision = %decision.id, error = %join_error, "Execution task died");
                        (ExecutionOutcome::Failure, Decimal::ZERO, Decimal::ZERO)
                    }
                    Err(_) => {
                        telemetry.incr_timeouts();
                        warn!(
                            decision = %decision.id,
                            timeout_secs = timeout.as_secs(),
                            "Execution timed out"
                        );
                        // A late out-of-band completion is logged only;
                        // it never retroactively adjusts risk state.
                        let late_id = decision.id.clone();
                        tokio::spawn(async move {
                            match handle.await {
                                Ok(Ok(report)) => debug!(
                                    decision = %late_id,
                                    success = report.success,
                                    "Late completion after timeout ignored"
                                ),
                                Ok(Err(error)) => debug!(
                                    decision = %late_id,
                                    error = %error,
                                    "Late failure after timeout ignored"
                                ),
                                Err(_) => {}
                            }
                        });
                        (ExecutionOutcome::Timeout, Decimal::ZERO, Decimal::ZERO)
                    }
                };

            let record = ExecutionRecord {
                decision_id: decision.id.clone(),
                route: decision.route.clone(),
                outcome,
                actual_profit: profit,
                actual_cost: cost,
                size,
                predicted_profit: decision.predicted_profit,
                latency: started.elapsed(),
                completed_at: Utc::now(),
            };

            // Learner first, then risk: breaker transitions see stats
            // that already include this record.
            learner.record(&record);
            risk.update(&record);
            telemetry.incr_completed();

            drop(permit);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CandidateSource;
    use crate::testkit::backend::ScriptedBackend;
    use crate::testkit::domain::{candidate, failure_report, success_report};
    use crate::testkit::wait_until;
    use rust_decimal_macros::dec;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.orchestrator.cooldown_seconds = 60;
        config.orchestrator.execution_timeout_secs = 5;
        config
    }

    fn orchestrator_with(
        config: &Config,
        backend: Arc<ScriptedBackend>,
    ) -> Orchestrator {
        Orchestrator::new(config, backend)
    }

    #[tokio::test]
    async fn clean_candidate_is_admitted_sized_and_executed_once() {
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        let results = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20))]);
        assert!(matches!(results[0], DispatchResult::Dispatched { .. }));

        wait_until(|| backend.calls() == 1).await;
        wait_until(|| orch.telemetry().completed() == 1).await;
        assert_eq!(backend.calls(), 1);

        let status = orch.status();
        assert_eq!(status.telemetry.admitted, 1);
        assert_eq!(status.telemetry.in_flight, 0);
    }

    #[tokio::test]
    async fn same_route_within_cooldown_is_dropped() {
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        let results = orch.tick(vec![
            candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20)),
            candidate("ETH-USDC", "uniswap-v3", dec!(55), dec!(20)),
        ]);

        let dispatched = results
            .iter()
            .filter(|r| matches!(r, DispatchResult::Dispatched { .. }))
            .count();
        let cooled = results
            .iter()
            .filter(|r| matches!(r, DispatchResult::RejectedByCooldown { .. }))
            .count();
        assert_eq!(dispatched, 1);
        assert_eq!(cooled, 1);
    }

    #[tokio::test]
    async fn concurrency_slots_bound_dispatch() {
        let mut config = test_config();
        config.orchestrator.max_concurrent = 1;
        let backend = Arc::new(
            ScriptedBackend::always(success_report(dec!(5), dec!(1)))
                .with_latency(Duration::from_millis(200)),
        );
        let orch = orchestrator_with(&config, Arc::clone(&backend));

        let results = orch.tick(vec![
            candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20)),
            candidate("BTC-USDT", "binance", dec!(60), dec!(20)),
        ]);

        let concurrency_rejected = results
            .iter()
            .filter(|r| matches!(r, DispatchResult::RejectedByConcurrency { .. }))
            .count();
        assert_eq!(concurrency_rejected, 1);
        wait_until(|| orch.telemetry().completed() == 1).await;
    }

    #[tokio::test]
    async fn timeout_recorded_as_failure_without_pnl() {
        let mut config = test_config();
        config.orchestrator.execution_timeout_secs = 0;
        let backend = Arc::new(
            ScriptedBackend::always(success_report(dec!(500), dec!(1)))
                .with_latency(Duration::from_millis(300)),
        );
        let orch = orchestrator_with(&config, Arc::clone(&backend));

        orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20))]);
        wait_until(|| orch.telemetry().completed() == 1).await;

        let status = orch.status();
        assert_eq!(status.telemetry.timeouts, 1);
        // Timeout carries no pnl, even though the late fill reported 500.
        assert_eq!(status.risk.equity, dec!(10_000));

        // Give the late completion a chance to land; it must not change
        // risk state.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(orch.status().risk.equity, dec!(10_000));
    }

    #[tokio::test]
    async fn open_breaker_rejects_top_scored_candidate() {
        let backend = Arc::new(ScriptedBackend::always(failure_report()));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        // Five failures trip the route's consecutive-failure breaker.
        for _ in 0..5 {
            orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20))]);
            wait_until(|| orch.status().telemetry.in_flight == 0).await;
            // Step past the cooldown window.
            orch.cooldowns.clear();
        }

        let results = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(90), dec!(10))]);
        assert!(matches!(
            results[0],
            DispatchResult::RejectedByRisk { .. }
        ));
        assert!(orch.status().telemetry.rejected_by_breaker >= 1);
    }

    #[tokio::test]
    async fn malformed_candidates_dropped_without_crashing_batch() {
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        let mut bad = candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20));
        bad.notional = Decimal::ZERO;
        let good = candidate("BTC-USDT", "binance", dec!(60), dec!(20));

        let results = orch.tick(vec![bad, good]);
        assert!(results.contains(&DispatchResult::Dropped));
        assert_eq!(orch.status().telemetry.dropped_malformed, 1);
        assert_eq!(orch.status().telemetry.admitted, 1);
    }

    #[tokio::test]
    async fn dry_run_never_calls_backend() {
        let mut config = test_config();
        config.dry_run = true;
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&config, Arc::clone(&backend));

        let results = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20))]);
        assert!(matches!(results[0], DispatchResult::Dispatched { .. }));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn reload_swaps_scorer_thresholds() {
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        let mut strict = test_config();
        strict.scorer.min_confidence = 0.99;
        orch.reload(&strict).unwrap();

        let results = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20))]);
        assert!(matches!(
            results[0],
            DispatchResult::RejectedByScorer { .. }
        ));
    }

    #[tokio::test]
    async fn regime_label_flows_into_scoring() {
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&test_config(), Arc::clone(&backend));

        // A marginal candidate admissible only in the friendliest regime.
        let mut strict = test_config();
        strict.scorer.min_confidence = 0.26;
        orch.reload(&strict).unwrap();

        orch.set_regime(crate::domain::MarketRegime::new(
            crate::domain::Trend::Bear,
            crate::domain::Volatility::High,
        ));
        let stormy = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(40), dec!(20))]);
        assert!(matches!(stormy[0], DispatchResult::RejectedByScorer { .. }));

        orch.set_regime(crate::domain::MarketRegime::default());
        orch.cooldowns.clear();
        let calm = orch.tick(vec![candidate("ETH-USDC", "uniswap-v3", dec!(40), dec!(20))]);
        assert!(matches!(calm[0], DispatchResult::Dispatched { .. }));
        wait_until(|| orch.telemetry().completed() == 1).await;
    }

    #[tokio::test]
    async fn batch_bound_is_respected() {
        let mut config = test_config();
        config.orchestrator.max_batch = 2;
        let backend = Arc::new(ScriptedBackend::always(success_report(dec!(5), dec!(1))));
        let orch = orchestrator_with(&config, Arc::clone(&backend));

        let batch: Vec<Candidate> = (0..10)
            .map(|i| {
                let mut c = candidate("ETH-USDC", "uniswap-v3", dec!(60), dec!(20));
                c.symbol = format!("SYM{i}");
                c.source = CandidateSource::CrossExchange;
                c
            })
            .collect();
        let results = orch.tick(batch);
        assert_eq!(results.len(), 2);
    }
}
