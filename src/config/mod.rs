//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file and consumed as an immutable
//! snapshot per tick; the engine swaps snapshots between ticks on reload.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

// Submodules
mod learner;
mod logging;
mod orchestrator;
mod risk;
mod scorer;
mod sizing;

// Re-export all public types from submodules
pub use learner::LearnerConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use orchestrator::OrchestratorConfig;
pub use risk::{BreakerConfig, RiskConfig};
pub use scorer::ScorerConfig;
pub use sizing::{KellyConfig, SizingConfig, SizingPolicyConfig, TargetUtilityConfig};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub learner: LearnerConfig,
    /// Dry-run mode: score and admit but never dispatch to the backend.
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weight_sum = self.scorer.weights.sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidValue {
                field: "scorer.weights",
                reason: format!("weights sum to {weight_sum}, expected 1"),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.scorer.min_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "scorer.min_confidence",
                reason: "must be within [0, 1]".to_string(),
            }
            .into());
        }
        if self.sizing.max_position_pct <= rust_decimal::Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "sizing.max_position_pct",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.sizing.min_size > self.sizing.max_size {
            return Err(ConfigError::InvalidValue {
                field: "sizing.min_size",
                reason: "exceeds sizing.max_size".to_string(),
            }
            .into());
        }
        if self.orchestrator.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orchestrator.max_concurrent",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.orchestrator.max_batch == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orchestrator.max_batch",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.learner.recalibration_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "learner.recalibration_interval",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.learner.alpha) {
            return Err(ConfigError::InvalidValue {
                field: "learner.alpha",
                reason: "must be within [0, 1]".to_string(),
            }
            .into());
        }
        if self.risk.ruin_floor >= self.risk.initial_equity {
            return Err(ConfigError::InvalidValue {
                field: "risk.ruin_floor",
                reason: "must be below initial_equity".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
