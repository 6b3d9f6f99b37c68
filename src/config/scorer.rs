//! Scorer configuration.

use serde::Deserialize;

use crate::domain::{RegimeTable, ScoreWeights};

/// Scorer configuration: factor weights, admission thresholds, and
/// normalization knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ScorerConfig {
    /// Factor weights; must sum to 1 (validated at load).
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Minimum confidence for a decision to be admissible.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Hard floor on depth/notional; candidates below it are rejected.
    #[serde(default = "default_liquidity_floor")]
    pub liquidity_floor: f64,
    /// Depth/notional ratio at which the liquidity factor saturates.
    #[serde(default = "default_liquidity_saturation")]
    pub liquidity_saturation: f64,
    /// Net edge (bps) at which the edge-quality factor saturates.
    #[serde(default = "default_edge_saturation_bps")]
    pub edge_saturation_bps: f64,
    /// Hop count at which the execution-risk factor bottoms out.
    #[serde(default = "default_max_hops")]
    pub max_hops: u8,
    /// Routes with fewer samples than this use the neutral history prior.
    #[serde(default = "default_min_history_samples")]
    pub min_history_samples: u64,
    /// Sample count at which confidence reaches the full composite.
    #[serde(default = "default_full_confidence_samples")]
    pub full_confidence_samples: u64,
    /// Confidence scale applied to a route with no history.
    #[serde(default = "default_new_route_confidence")]
    pub new_route_confidence: f64,
    /// Regime-fit sub-score per regime bucket.
    #[serde(default = "default_regime_fit")]
    pub regime_fit: RegimeTable,
}

const fn default_min_confidence() -> f64 {
    0.25
}

const fn default_liquidity_floor() -> f64 {
    1.0
}

const fn default_liquidity_saturation() -> f64 {
    5.0
}

const fn default_edge_saturation_bps() -> f64 {
    100.0
}

const fn default_max_hops() -> u8 {
    5
}

const fn default_min_history_samples() -> u64 {
    10
}

const fn default_full_confidence_samples() -> u64 {
    30
}

const fn default_new_route_confidence() -> f64 {
    0.5
}

const fn default_regime_fit() -> RegimeTable {
    RegimeTable {
        bull_low: 0.9,
        bull_high: 0.6,
        bear_low: 0.7,
        bear_high: 0.4,
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_confidence: default_min_confidence(),
            liquidity_floor: default_liquidity_floor(),
            liquidity_saturation: default_liquidity_saturation(),
            edge_saturation_bps: default_edge_saturation_bps(),
            max_hops: default_max_hops(),
            min_history_samples: default_min_history_samples(),
            full_confidence_samples: default_full_confidence_samples(),
            new_route_confidence: default_new_route_confidence(),
            regime_fit: default_regime_fit(),
        }
    }
}
