//! Adaptive learner configuration.

use serde::Deserialize;

/// Adaptive learner configuration: EMA recency and recalibration cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerConfig {
    /// EMA recency weight; higher values react faster.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Terminal records between recalibration passes.
    #[serde(default = "default_recalibration_interval")]
    pub recalibration_interval: u64,
    /// Recalibration is a no-op below this many retained records.
    #[serde(default = "default_min_recalibration_samples")]
    pub min_recalibration_samples: usize,
    /// Recent records retained for recalibration.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Lower bound on the route-history calibration gain.
    #[serde(default = "default_min_gain")]
    pub min_gain: f64,
    /// Upper bound on the route-history calibration gain.
    #[serde(default = "default_max_gain")]
    pub max_gain: f64,
}

const fn default_alpha() -> f64 {
    0.15
}

const fn default_recalibration_interval() -> u64 {
    25
}

const fn default_min_recalibration_samples() -> usize {
    50
}

const fn default_window() -> usize {
    200
}

const fn default_min_gain() -> f64 {
    0.5
}

const fn default_max_gain() -> f64 {
    1.5
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            recalibration_interval: default_recalibration_interval(),
            min_recalibration_samples: default_min_recalibration_samples(),
            window: default_window(),
            min_gain: default_min_gain(),
            max_gain: default_max_gain(),
        }
    }
}
