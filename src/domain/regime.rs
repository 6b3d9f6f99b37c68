//! Market regime classification supplied by an external labeller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional trend component of a regime label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[default]
    Bull,
    Bear,
}

/// Volatility component of a regime label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    #[default]
    Low,
    High,
}

/// Externally supplied market-regime label (trend x volatility).
///
/// The orchestrator treats the label as opaque input: it only selects
/// configured multipliers and fit scores per label, it never computes one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketRegime {
    pub trend: Trend,
    pub volatility: Volatility,
}

impl MarketRegime {
    #[must_use]
    pub const fn new(trend: Trend, volatility: Volatility) -> Self {
        Self { trend, volatility }
    }

    /// True in either high-volatility bucket.
    #[must_use]
    pub const fn is_high_volatility(&self) -> bool {
        matches!(self.volatility, Volatility::High)
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trend = match self.trend {
            Trend::Bull => "bull",
            Trend::Bear => "bear",
        };
        let vol = match self.volatility {
            Volatility::Low => "low-vol",
            Volatility::High => "high-vol",
        };
        write!(f, "{trend}/{vol}")
    }
}

/// A value configured per regime bucket, e.g. a sizing multiplier or a
/// regime-fit sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeTable {
    pub bull_low: f64,
    pub bull_high: f64,
    pub bear_low: f64,
    pub bear_high: f64,
}

impl RegimeTable {
    /// Look up the value for a regime label.
    #[must_use]
    pub const fn get(&self, regime: MarketRegime) -> f64 {
        match (regime.trend, regime.volatility) {
            (Trend::Bull, Volatility::Low) => self.bull_low,
            (Trend::Bull, Volatility::High) => self.bull_high,
            (Trend::Bear, Volatility::Low) => self.bear_low,
            (Trend::Bear, Volatility::High) => self.bear_high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_regime_is_bull_low() {
        let regime = MarketRegime::default();
        assert_eq!(regime.trend, Trend::Bull);
        assert_eq!(regime.volatility, Volatility::Low);
        assert!(!regime.is_high_volatility());
    }

    #[test]
    fn table_lookup_matches_bucket() {
        let table = RegimeTable {
            bull_low: 1.0,
            bull_high: 0.5,
            bear_low: 0.8,
            bear_high: 0.3,
        };
        assert_eq!(
            table.get(MarketRegime::new(Trend::Bear, Volatility::High)),
            0.3
        );
        assert_eq!(
            table.get(MarketRegime::new(Trend::Bull, Volatility::Low)),
            1.0
        );
    }

    #[test]
    fn display_is_human_readable() {
        let regime = MarketRegime::new(Trend::Bear, Volatility::High);
        assert_eq!(format!("{regime}"), "bear/high-vol");
    }
}
