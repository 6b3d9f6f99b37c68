//! Edgewarden - Risk-managed arbitrage decision and execution
//! orchestration.
//!
//! This crate takes a stream of candidate trade opportunities from
//! heterogeneous producers, scores and ranks them, sizes admitted
//! decisions, gates them through hard limits and a bank of circuit
//! breakers, dispatches to a pluggable execution backend under bounded
//! concurrency, and learns from outcomes.
//!
//! # Architecture
//!
//! Data flows one way per tick:
//!
//! candidates -> [`scorer::Scorer`] -> [`risk::RiskManager`] ->
//! [`sizing::PositionSizer`] -> [`orchestrator::Orchestrator`] ->
//! [`orchestrator::ExecutionBackend`] -> outcome ->
//! [`learner::AdaptiveLearner`] + [`risk::RiskManager`].
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Producer-agnostic types: candidates, decisions, records
//! - [`error`] - Error types for the crate
//! - [`scorer`] - Multi-factor candidate evaluation and ranking
//! - [`sizing`] - Kelly-with-ruin and target-utility position sizing
//! - [`risk`] - Hard limits, circuit breakers, and the admission gate
//! - [`learner`] - Per-route EMA statistics and recalibration
//! - [`orchestrator`] - The central tick loop and execution dispatch
//! - [`app`] - Application wiring for the binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use edgewarden::config::Config;
//! use edgewarden::orchestrator::{Orchestrator, PaperBackend};
//!
//! let config = Config::default();
//! let orchestrator = Orchestrator::new(&config, Arc::new(PaperBackend::default()));
//! let results = orchestrator.tick(Vec::new());
//! assert!(results.is_empty());
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod learner;
pub mod orchestrator;
pub mod risk;
pub mod scorer;
pub mod sizing;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
