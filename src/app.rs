//! Application wiring for the binary: builds the orchestrator, feeds it
//! candidate batches on a fixed cadence, and logs status snapshots.
//!
//! Candidate production is external to the decision loop; the built-in
//! producer synthesizes plausible opportunities over a handful of routes
//! so paper deployments exercise the full pipeline.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::Config;
use crate::domain::{Candidate, CandidateSource, CostBreakdown};
use crate::error::Result;
use crate::orchestrator::{Orchestrator, PaperBackend};

/// Routes the synthetic producer rotates through.
const DEMO_ROUTES: [(&str, &str, CandidateSource); 4] = [
    ("ETH-USDC", "uniswap-v3", CandidateSource::OnChain),
    ("WBTC-USDC", "curve", CandidateSource::OnChain),
    ("BTC-USDT", "binance", CandidateSource::CrossExchange),
    ("SOL-USDC", "whale-7f3a", CandidateSource::CopyTrade),
];

/// Main application runner.
pub struct App;

impl App {
    /// Run the orchestration loop until shutdown or a fatal ruin halt.
    pub async fn run(config: Config) -> Result<()> {
        let backend = Arc::new(PaperBackend::default());
        let orchestrator = Arc::new(Orchestrator::new(&config, backend));

        let (tx, mut rx) = mpsc::channel::<Candidate>(1024);
        tokio::spawn(produce_candidates(tx));

        let max_batch = config.orchestrator.max_batch;
        let mut ticker =
            tokio::time::interval(Duration::from_millis(config.orchestrator.tick_interval_ms));
        let mut status_ticker = tokio::time::interval(Duration::from_secs(10));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mut batch = Vec::new();
                    while batch.len() < max_batch {
                        match rx.try_recv() {
                            Ok(candidate) => batch.push(candidate),
                            Err(_) => break,
                        }
                    }
                    if !batch.is_empty() {
                        orchestrator.tick(batch);
                    }
                    if orchestrator.risk().is_halted() {
                        error!("Risk manager halted; stopping orchestration loop");
                        return Ok(());
                    }
                }
                _ = status_ticker.tick() => {
                    let status = orchestrator.status();
                    info!(
                        admitted = status.telemetry.admitted,
                        rejected_by_breaker = status.telemetry.rejected_by_breaker,
                        rejected_by_cooldown = status.telemetry.rejected_by_cooldown,
                        in_flight = status.telemetry.in_flight,
                        equity = %status.risk.equity,
                        daily_pnl = %status.risk.daily_pnl,
                        "Status"
                    );
                }
            }
        }
    }
}

/// Synthesize candidates at a steady trickle.
async fn produce_candidates(tx: mpsc::Sender<Candidate>) {
    let mut interval = tokio::time::interval(Duration::from_millis(150));
    loop {
        interval.tick().await;
        let candidate = synthetic_candidate();
        if tx.send(candidate).await.is_err() {
            return;
        }
    }
}

/// One plausible candidate on a random demo route.
fn synthetic_candidate() -> Candidate {
    let mut rng = rand::thread_rng();
    let (symbol, venue, source) = DEMO_ROUTES[rng.gen_range(0..DEMO_ROUTES.len())];

    let edge_bps = Decimal::from(rng.gen_range(5..120));
    let notional = Decimal::from(rng.gen_range(1_000..20_000));
    let gas = Decimal::from(rng.gen_range(1..8));
    let fee = Decimal::from(rng.gen_range(1..10));
    let slippage = Decimal::from(rng.gen_range(0..12));
    let hops = rng.gen_range(1..4u8);

    Candidate {
        symbol: symbol.to_string(),
        venue: venue.to_string(),
        source,
        edge_bps,
        notional,
        costs: CostBreakdown {
            gas_bps: gas,
            protocol_fee_bps: fee,
            slippage_bps: slippage,
            hop_penalty_bps: Decimal::from(u32::from(hops.saturating_sub(1)) * 2),
        },
        hops,
        liquidity_depth: notional * Decimal::from(rng.gen_range(1..8)),
        observed_at: chrono::Utc::now(),
    }
}
