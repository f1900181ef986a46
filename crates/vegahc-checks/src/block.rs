//! Block production checks: is core producing blocks.
//!
//! Two variants compare the core block height across two probes:
//!
//! - [`BlockIncrease`] probes at most once per cycle and remembers the
//!   last observation, so its cost does not depend on the period between
//!   the compared probes.
//! - [`BlockIncreaseBlocking`] probes twice in the same cycle with a
//!   sleep in between, stalling the cycle for the whole period.
//!
//! Both fail when either height is below the minimum height or when the
//! second height is not strictly greater than the first.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};
use vegahc_probe::ProbeClient;

use crate::check::{endpoint, parse_height, CheckContext, CheckFuture, HealthCheck};
use crate::error::{CheckError, Dependency};
use crate::types::StatisticsResponse;

/// A block height and when it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    height: u64,
    observed_at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
enum BlockState {
    /// Nothing observed yet.
    Uninitialized,
    /// One observation, no verdict yet.
    Gated { baseline: Observation },
    /// At least one comparison has been made.
    Evaluated {
        baseline: Observation,
        verdict: Result<(), CheckError>,
    },
}

/// Stateful block increase check.
///
/// The first evaluation records a baseline and reports
/// [`CheckError::Initializing`]. Until `period` has passed since the
/// baseline, evaluations make no probe and repeat the last verdict (or
/// `Initializing` if there is none). Once eligible, a fresh probe is
/// compared against the baseline and becomes the new baseline.
///
/// Observations are stamped with the cycle's scheduled start when the
/// scheduler supplies one, so cycles `period` apart always qualify no
/// matter how long the checks ahead of this one took.
#[derive(Debug)]
pub struct BlockIncrease {
    url: String,
    client: ProbeClient,
    period: Duration,
    min_height: u64,
    state: BlockState,
    /// Scheduled start of the current cycle, if the scheduler gave one.
    cycle_started: Option<Instant>,
}

impl BlockIncrease {
    async fn evaluate(&mut self) -> Result<(), CheckError> {
        let now = self.cycle_started.take().unwrap_or_else(Instant::now);

        let (baseline, last_verdict) = match &self.state {
            BlockState::Uninitialized => (None, None),
            BlockState::Gated { baseline } => (Some(*baseline), None),
            BlockState::Evaluated { baseline, verdict } => (Some(*baseline), Some(verdict.clone())),
        };

        let Some(baseline) = baseline else {
            return self.initialize(now).await;
        };

        let elapsed = now.duration_since(baseline.observed_at);
        if elapsed < self.period {
            return last_verdict.unwrap_or(Err(CheckError::Initializing));
        }

        // A failed probe leaves the baseline in place for the next cycle.
        let height = observe_height(&self.client, &self.url).await?;

        debug!(
            previous = baseline.height,
            current = height,
            elapsed_ms = elapsed.as_millis() as u64,
            "comparing block heights"
        );

        let verdict = compare_heights(baseline.height, height, self.min_height);
        self.state = BlockState::Evaluated {
            baseline: Observation {
                height,
                observed_at: now,
            },
            verdict: verdict.clone(),
        };
        verdict
    }

    async fn initialize(&mut self, now: Instant) -> Result<(), CheckError> {
        match observe_height(&self.client, &self.url).await {
            Ok(height) => {
                debug!(height, "block increase baseline recorded");
                self.state = BlockState::Gated {
                    baseline: Observation {
                        height,
                        observed_at: now,
                    },
                };
            }
            Err(e) => {
                warn!(error = %e, "block increase baseline probe failed");
            }
        }
        Err(CheckError::Initializing)
    }
}

impl HealthCheck for BlockIncrease {
    fn name(&self) -> &'static str {
        "block-increase"
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }

    fn begin_cycle(&mut self, started: Instant) {
        self.cycle_started = Some(started);
    }
}

/// Two probes separated by a sleep, in one evaluation.
#[derive(Debug)]
pub struct BlockIncreaseBlocking {
    url: String,
    client: ProbeClient,
    sleep: Duration,
    min_height: u64,
}

impl BlockIncreaseBlocking {
    async fn evaluate(&self) -> Result<(), CheckError> {
        let first = observe_height(&self.client, &self.url).await?;
        tokio::time::sleep(self.sleep).await;
        let second = observe_height(&self.client, &self.url).await?;
        compare_heights(first, second, self.min_height)
    }
}

impl HealthCheck for BlockIncreaseBlocking {
    fn name(&self) -> &'static str {
        "block-increase"
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }
}

/// Stateful block increase check comparing probes at least `period` apart.
pub fn block_increase(core_url: &str, period: Duration, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(BlockIncrease {
        url: endpoint(core_url, "/statistics"),
        client: ctx.client.clone(),
        period,
        min_height: ctx.thresholds.min_block_height,
        state: BlockState::Uninitialized,
        cycle_started: None,
    })
}

/// Block increase check that sleeps for `sleep` between its two probes.
pub fn block_increase_blocking(
    core_url: &str,
    sleep: Duration,
    ctx: &CheckContext,
) -> Box<dyn HealthCheck> {
    Box::new(BlockIncreaseBlocking {
        url: endpoint(core_url, "/statistics"),
        client: ctx.client.clone(),
        sleep,
        min_height: ctx.thresholds.min_block_height,
    })
}

async fn observe_height(client: &ProbeClient, url: &str) -> Result<u64, CheckError> {
    let (_, stats) = client
        .get_json::<StatisticsResponse>(url)
        .await
        .map_err(|e| {
            warn!(check = "block-increase", %url, error = %e, "probe failed");
            CheckError::from_probe(Dependency::Core, &e)
        })?;
    parse_height(&stats.statistics.block_height)
}

fn compare_heights(previous: u64, current: u64, min_height: u64) -> Result<(), CheckError> {
    if previous < min_height || current < min_height || current <= previous {
        return Err(CheckError::BlockDidNotIncrease { previous, current });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_below_minimum_fail() {
        assert_eq!(
            compare_heights(80, 120, 100),
            Err(CheckError::BlockDidNotIncrease {
                previous: 80,
                current: 120
            })
        );
        assert!(compare_heights(120, 99, 100).is_err());
    }

    #[test]
    fn non_increasing_heights_fail() {
        assert!(compare_heights(120, 119, 100).is_err());
        assert!(compare_heights(120, 120, 100).is_err());
    }

    #[test]
    fn increasing_heights_pass() {
        assert_eq!(compare_heights(120, 121, 100), Ok(()));
        assert_eq!(compare_heights(100, 101, 100), Ok(()));
    }

    #[tokio::test]
    async fn first_evaluation_reports_initializing_even_when_unreachable() {
        let ctx = CheckContext::new(
            ProbeClient::with_timeout(Duration::from_millis(200)),
            Default::default(),
        );
        let mut check = block_increase("http://127.0.0.1:1", Duration::ZERO, &ctx);
        assert_eq!(check.check().await, Err(CheckError::Initializing));
    }
}
