//! The health check loop.
//!
//! Every tick, and once immediately on start, every check is evaluated in
//! registration order. Failures are collected rather than short-circuited,
//! and the cycle's verdict is handed to the forwarder over a one-slot
//! channel. A full slot blocks the loop, so a slow forwarder delays the
//! next cycle instead of queueing verdicts.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vegahc_checks::HealthCheck;

use crate::verdict::CheckResult;

/// Evaluate every check once, in order, and aggregate the outcome.
pub async fn run_cycle(checks: &mut [Box<dyn HealthCheck>]) -> CheckResult {
    run_cycle_at(checks, Instant::now()).await
}

/// [`run_cycle`] for a cycle scheduled to start at `started`.
pub async fn run_cycle_at(checks: &mut [Box<dyn HealthCheck>], started: Instant) -> CheckResult {
    let mut reasons = Vec::new();
    for check in checks.iter_mut() {
        check.begin_cycle(started);
        if let Err(e) = check.check().await {
            warn!(check = check.name(), error = %e, "endpoint unhealthy");
            reasons.push(e);
        }
    }
    CheckResult::from_reasons(reasons)
}

/// Run cycles every `interval` until `shutdown` fires.
///
/// Shutdown is observed while waiting for a tick, while the checks run,
/// and while waiting for the forwarder to accept a verdict. `interval`
/// must be non-zero.
pub async fn run_check_loop(
    mut checks: Vec<Box<dyn HealthCheck>>,
    interval: Duration,
    results: mpsc::Sender<CheckResult>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        interval_secs = interval.as_secs(),
        checks = checks.len(),
        "health check loop started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let started = tokio::select! {
            started = ticker.tick() => started,
            _ = shutdown_requested(&mut shutdown) => break,
        };

        let result = tokio::select! {
            result = run_cycle_at(&mut checks, started) => result,
            _ = shutdown_requested(&mut shutdown) => break,
        };

        debug!(
            status = result.status().as_str(),
            reasons = result.reasons().len(),
            "health check loop execution finished"
        );

        tokio::select! {
            sent = results.send(result) => {
                if sent.is_err() {
                    warn!("result forwarder is gone");
                    break;
                }
            }
            _ = shutdown_requested(&mut shutdown) => break,
        }
    }

    info!("health check loop stopped due to shutdown");
}

/// Resolves once `true` is sent on `shutdown`, or once the sender is gone.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
