//! Orchestrator loop configuration.

use serde::Deserialize;

/// Orchestrator configuration: batching, concurrency, and cooldowns.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum candidates drained per tick.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    /// Failed admission attempts tolerated per tick before the ranked
    /// walk stops.
    #[serde(default = "default_max_admission_attempts")]
    pub max_admission_attempts: usize,
    /// Maximum concurrently outstanding executions.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-route cooldown between dispatches, in seconds.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    /// Per-execution deadline, in seconds. Elapsing counts as failure.
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,
    /// Batch cycle interval for the run loop, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

const fn default_max_batch() -> usize {
    64
}

const fn default_max_admission_attempts() -> usize {
    8
}

const fn default_max_concurrent() -> usize {
    4
}

const fn default_cooldown_seconds() -> u64 {
    30
}

const fn default_execution_timeout_secs() -> u64 {
    30
}

const fn default_tick_interval_ms() -> u64 {
    500
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
            max_admission_attempts: default_max_admission_attempts(),
            max_concurrent: default_max_concurrent(),
            cooldown_seconds: default_cooldown_seconds(),
            execution_timeout_secs: default_execution_timeout_secs(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}
