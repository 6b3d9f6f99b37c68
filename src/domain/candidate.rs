//! Candidate trade opportunities as delivered by external producers.
//!
//! A [`Candidate`] is immutable once produced: the orchestrator never
//! amends edge, notional, or costs after ingestion. Producers are
//! heterogeneous (on-chain spreads, cross-exchange spreads, copy-trade
//! signals) and only share this record shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CandidateError;

use super::id::RouteId;

/// Basis points per whole unit.
pub const BPS_SCALE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Where a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// On-chain price spread (DEX vs DEX).
    OnChain,
    /// Off-chain spread between centralized exchanges.
    CrossExchange,
    /// Copy-trading signal from a followed account.
    CopyTrade,
}

/// Cost breakdown for executing a candidate, all in basis points of notional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Gas or network fee estimate.
    pub gas_bps: Decimal,
    /// Protocol / exchange fee.
    pub protocol_fee_bps: Decimal,
    /// Expected slippage at the quoted depth.
    pub slippage_bps: Decimal,
    /// Penalty per additional hop in the route.
    pub hop_penalty_bps: Decimal,
}

impl CostBreakdown {
    /// Total execution cost in basis points.
    #[must_use]
    pub fn total_bps(&self) -> Decimal {
        self.gas_bps + self.protocol_fee_bps + self.slippage_bps + self.hop_penalty_bps
    }

    fn any_negative(&self) -> bool {
        self.gas_bps.is_sign_negative()
            || self.protocol_fee_bps.is_sign_negative()
            || self.slippage_bps.is_sign_negative()
            || self.hop_penalty_bps.is_sign_negative()
    }
}

/// A candidate trade opportunity. Read-only after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Traded symbol, e.g. "ETH-USDC".
    pub symbol: String,
    /// Venue or chain identifier, e.g. "uniswap-v3" or "binance".
    pub venue: String,
    /// Producer category this candidate came from.
    pub source: CandidateSource,
    /// Expected gross edge in basis points of notional.
    pub edge_bps: Decimal,
    /// Notional size the producer observed the edge at.
    pub notional: Decimal,
    /// Execution cost estimate.
    pub costs: CostBreakdown,
    /// Number of hops in the route (1 = direct).
    pub hops: u8,
    /// Available liquidity depth at the quoted prices.
    pub liquidity_depth: Decimal,
    /// When the producer observed this opportunity.
    pub observed_at: DateTime<Utc>,
}

impl Candidate {
    /// Canonical route identity for cooldown and statistics tracking.
    #[must_use]
    pub fn route_id(&self) -> RouteId {
        RouteId::for_route(&self.symbol, &self.venue)
    }

    /// Total execution cost in basis points.
    #[must_use]
    pub fn total_cost_bps(&self) -> Decimal {
        self.costs.total_bps()
    }

    /// Edge remaining after costs, in basis points. May be negative.
    #[must_use]
    pub fn net_edge_bps(&self) -> Decimal {
        self.edge_bps - self.total_cost_bps()
    }

    /// Expected profit after costs at the observed notional.
    #[must_use]
    pub fn profit_after_cost(&self) -> Decimal {
        self.notional * self.net_edge_bps() / BPS_SCALE
    }

    /// Ratio of available depth to notional. Zero when notional is zero
    /// (such candidates fail validation anyway).
    #[must_use]
    pub fn depth_ratio(&self) -> Decimal {
        if self.notional.is_zero() {
            Decimal::ZERO
        } else {
            self.liquidity_depth / self.notional
        }
    }

    /// Reject structurally malformed candidates before they enter the
    /// pipeline. Validation failure is a drop, never a crash.
    pub fn validate(&self) -> Result<(), CandidateError> {
        if self.symbol.trim().is_empty() {
            return Err(CandidateError::EmptyField { field: "symbol" });
        }
        if self.venue.trim().is_empty() {
            return Err(CandidateError::EmptyField { field: "venue" });
        }
        if self.notional <= Decimal::ZERO {
            return Err(CandidateError::NonPositiveNotional {
                notional: self.notional,
            });
        }
        if self.liquidity_depth.is_sign_negative() {
            return Err(CandidateError::NegativeDepth {
                depth: self.liquidity_depth,
            });
        }
        if self.costs.any_negative() {
            return Err(CandidateError::NegativeCost);
        }
        if self.hops == 0 {
            return Err(CandidateError::ZeroHops);
        }
        // An edge above 100% of notional is a data error, not an opportunity.
        if self.edge_bps.abs() > BPS_SCALE {
            return Err(CandidateError::ImplausibleEdge {
                edge_bps: self.edge_bps,
            });
        }
        Ok(())
    }
}
