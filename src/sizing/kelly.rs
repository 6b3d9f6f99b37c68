//! Fractional Kelly sizing with a ruin clip.

use crate::config::KellyConfig;

/// Raw fractional-Kelly bet fraction: `multiplier * edge / variance`.
///
/// Monotonically non-decreasing in edge and non-increasing in variance.
/// Negative edges size to zero.
#[must_use]
pub fn kelly_fraction(edge: f64, variance: f64, config: &KellyConfig) -> f64 {
    if edge <= 0.0 || variance <= 0.0 {
        return 0.0;
    }
    (config.fractional_multiplier * edge / variance).max(0.0)
}

/// Largest fraction whose loss at the configured confidence level stays
/// within the drawdown bound: `z * sigma * f <= drawdown_bound`.
#[must_use]
pub fn ruin_clip(variance: f64, config: &KellyConfig) -> f64 {
    let sigma = variance.max(0.0).sqrt();
    let at_risk = config.confidence_z * sigma;
    if at_risk <= 0.0 {
        return f64::INFINITY;
    }
    config.drawdown_bound / at_risk
}

/// Kelly-with-ruin bet fraction: raw Kelly clipped so the confidence-level
/// loss never exceeds the drawdown bound.
#[must_use]
pub fn fraction(edge: f64, variance: f64, config: &KellyConfig) -> f64 {
    kelly_fraction(edge, variance, config).min(ruin_clip(variance, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KellyConfig {
        KellyConfig {
            fractional_multiplier: 0.5,
            confidence_z: 1.645,
            drawdown_bound: 0.10,
        }
    }

    #[test]
    fn zero_for_non_positive_edge() {
        assert_eq!(fraction(0.0, 0.01, &config()), 0.0);
        assert_eq!(fraction(-0.05, 0.01, &config()), 0.0);
    }

    #[test]
    fn half_kelly_at_moderate_edge() {
        // 0.5 * 0.004 / 0.01 = 0.2, below the clip for this variance.
        let f = fraction(0.004, 0.01, &config());
        assert!((f - 0.2).abs() < 1e-9);
    }

    #[test]
    fn ruin_clip_caps_large_edges() {
        // Raw Kelly would be 0.5 * 0.5 / 0.01 = 25; the clip allows
        // 0.10 / (1.645 * 0.1) ~ 0.607.
        let f = fraction(0.5, 0.01, &config());
        assert!((f - 0.10 / (1.645 * 0.1)).abs() < 1e-9);
    }

    #[test]
    fn monotone_non_decreasing_in_edge() {
        let cfg = config();
        let variance = 0.02;
        let mut last = 0.0;
        for i in 0..200 {
            let edge = f64::from(i) * 0.001;
            let f = fraction(edge, variance, &cfg);
            assert!(f >= last, "fraction decreased at edge {edge}");
            last = f;
        }
    }

    #[test]
    fn monotone_non_increasing_in_variance() {
        let cfg = config();
        let edge = 0.01;
        let mut last = f64::INFINITY;
        for i in 1..200 {
            let variance = f64::from(i) * 0.001;
            let f = fraction(edge, variance, &cfg);
            assert!(f <= last, "fraction increased at variance {variance}");
            last = f;
        }
    }
}
