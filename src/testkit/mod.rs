//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for domain primitives: candidates, decisions,
//!   execution records and reports.
//! - [`backend`] — [`ScriptedBackend`](backend::ScriptedBackend), a mock
//!   execution backend with scripted outcomes and a concurrency probe.

pub mod backend;
pub mod domain;

use std::time::Duration;

/// Poll `cond` until it holds, panicking after five seconds.
pub async fn wait_until(cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not met within 5s");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
