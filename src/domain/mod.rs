//! Producer-agnostic domain types: candidates, scored decisions,
//! execution records, route statistics, and regime labels.

pub mod candidate;
pub mod decision;
pub mod execution;
pub mod id;
pub mod regime;
pub mod score;
pub mod stats;

pub use candidate::{Candidate, CandidateSource, CostBreakdown, BPS_SCALE};
pub use decision::{RejectReason, ScoredDecision};
pub use execution::{DispatchResult, ExecutionOutcome, ExecutionRecord, ExecutionReport};
pub use id::{DecisionId, RouteId};
pub use regime::{MarketRegime, RegimeTable, Trend, Volatility};
pub use score::{ScoreFactors, ScoreWeights};
pub use stats::RouteStats;
