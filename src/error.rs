use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Why a candidate record is structurally unusable.
///
/// Malformed candidates are dropped with a counter bump; they never fail
/// a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("empty field: {field}")]
    EmptyField { field: &'static str },

    #[error("non-positive notional: {notional}")]
    NonPositiveNotional { notional: Decimal },

    #[error("negative liquidity depth: {depth}")]
    NegativeDepth { depth: Decimal },

    #[error("negative cost component")]
    NegativeCost,

    #[error("route with zero hops")]
    ZeroHops,

    #[error("implausible edge: {edge_bps} bps")]
    ImplausibleEdge { edge_bps: Decimal },
}

/// Risk admission rejections. Ordinary control flow, never logged as
/// errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("trading halted: equity {equity} below ruin floor {floor}")]
    Halted { equity: Decimal, floor: Decimal },

    #[error("circuit breaker open: {breaker}")]
    BreakerOpen { breaker: String },

    #[error("breaker {breaker} half-open with a trial already in flight")]
    TrialPending { breaker: String },

    #[error("daily trade cap reached: {count} >= {cap}")]
    DailyTradeCapReached { count: u32, cap: u32 },

    #[error("max concurrent executions reached: {in_flight} >= {max}")]
    MaxConcurrentReached { in_flight: u32, max: u32 },

    #[error("size {size} exceeds position cap {cap}")]
    PositionTooLarge { size: Decimal, cap: Decimal },
}

/// Execution backend errors.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("failed to submit order: {0}")]
    SubmissionFailed(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
