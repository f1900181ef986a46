//! Wires the check loop, the forwarder and the result store together.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};
use vegahc_checks::HealthCheck;

use crate::forwarder::run_forwarder;
use crate::scheduler::run_check_loop;
use crate::store::{result_store, ResultStore};

/// Default time between check cycles.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// A fixed, ordered set of checks evaluated on an interval.
pub struct HealthMonitor {
    checks: Vec<Box<dyn HealthCheck>>,
    interval: Duration,
}

/// Handles to the two background tasks started by [`HealthMonitor::start`].
#[derive(Debug)]
pub struct MonitorHandle {
    scheduler: JoinHandle<()>,
    forwarder: JoinHandle<()>,
}

impl HealthMonitor {
    pub fn new(checks: Vec<Box<dyn HealthCheck>>, interval: Duration) -> Self {
        Self { checks, interval }
    }

    /// Names of the registered checks, in evaluation order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Spawn the check loop and the forwarder.
    ///
    /// Returns the read side of the result store, which holds `Unknown`
    /// until the first cycle is forwarded.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> (ResultStore, MonitorHandle) {
        let (store, writer) = result_store();
        let (tx, rx) = mpsc::channel(1);

        info!(checks = ?self.check_names(), "starting health monitor");

        let scheduler = tokio::spawn(run_check_loop(
            self.checks,
            self.interval,
            tx,
            shutdown.clone(),
        ));
        let forwarder = tokio::spawn(run_forwarder(rx, writer, shutdown));

        (store, MonitorHandle { scheduler, forwarder })
    }
}

impl MonitorHandle {
    /// Wait for both tasks to exit.
    pub async fn join(self) {
        if let Err(e) = self.scheduler.await {
            error!(error = %e, "health check loop task failed");
        }
        if let Err(e) = self.forwarder.await {
            error!(error = %e, "result forwarder task failed");
        }
    }
}
