//! Moves verdicts from the handoff channel into the result store.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::scheduler::shutdown_requested;
use crate::store::StoreWriter;
use crate::verdict::CheckResult;

/// Store every verdict received until `shutdown` fires or the loop hangs up.
///
/// Shutdown takes precedence over a pending verdict, so nothing is
/// written once shutdown has been observed.
pub async fn run_forwarder(
    mut results: mpsc::Receiver<CheckResult>,
    writer: StoreWriter,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;

            _ = shutdown_requested(&mut shutdown) => break,
            received = results.recv() => match received {
                Some(result) => {
                    debug!(status = result.status().as_str(), "storing health check result");
                    writer.replace(result).await;
                }
                None => break,
            },
        }
    }

    info!("health check result forwarder finished");
}
