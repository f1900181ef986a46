//! Clock skew: how far the latest block time trails the core wall clock.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tracing::warn;
use vegahc_probe::ProbeClient;

use crate::check::{endpoint, CheckContext, CheckFuture, HealthCheck};
use crate::error::{CheckError, Dependency};
use crate::types::StatisticsResponse;

#[derive(Debug)]
pub struct ClockSkew {
    url: String,
    client: ProbeClient,
    max_time_diff: Duration,
}

impl ClockSkew {
    async fn evaluate(&self) -> Result<(), CheckError> {
        let (_, stats) = self
            .client
            .get_json::<StatisticsResponse>(&self.url)
            .await
            .map_err(|e| {
                warn!(check = "clock-skew", url = %self.url, error = %e, "probe failed");
                CheckError::from_probe(Dependency::Core, &e)
            })?;

        let current_time = parse_time(&stats.statistics.current_time).ok_or_else(|| {
            warn!(check = "clock-skew", value = %stats.statistics.current_time, "bad current time");
            CheckError::CurrentTimeParse
        })?;
        let vega_time = parse_time(&stats.statistics.vega_time).ok_or_else(|| {
            warn!(check = "clock-skew", value = %stats.statistics.vega_time, "bad vega time");
            CheckError::VegaTimeParse
        })?;

        skew_within(current_time, vega_time, self.max_time_diff)
    }
}

impl HealthCheck for ClockSkew {
    fn name(&self) -> &'static str {
        "clock-skew"
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }
}

/// `statistics.currentTime − statistics.vegaTime` stays within the time diff threshold.
pub fn clock_skew(core_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(ClockSkew {
        url: endpoint(core_url, "/statistics"),
        client: ctx.client.clone(),
        max_time_diff: ctx.thresholds.max_time_diff,
    })
}

fn parse_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

fn skew_within(
    current_time: DateTime<FixedOffset>,
    vega_time: DateTime<FixedOffset>,
    max_time_diff: Duration,
) -> Result<(), CheckError> {
    // Negative skew (vega time ahead of the wall clock) fails to convert and passes.
    match (current_time - vega_time).to_std() {
        Ok(skew) if skew > max_time_diff => Err(CheckError::TimeDiffTooBig {
            skew_secs: skew.as_secs(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        parse_time(raw).unwrap()
    }

    #[test]
    fn parses_nanosecond_rfc3339() {
        assert!(parse_time("2024-03-01T10:00:00.123456789Z").is_some());
        assert!(parse_time("2024-03-01T10:00:00+02:00").is_some());
        assert!(parse_time("yesterday").is_none());
        assert!(parse_time("").is_none());
    }

    #[test]
    fn small_skew_passes() {
        let max = Duration::from_secs(60);
        assert_eq!(
            skew_within(at("2024-03-01T10:00:30Z"), at("2024-03-01T10:00:00Z"), max),
            Ok(())
        );
    }

    #[test]
    fn large_skew_fails() {
        let max = Duration::from_secs(60);
        assert_eq!(
            skew_within(at("2024-03-01T10:01:30Z"), at("2024-03-01T10:00:00Z"), max),
            Err(CheckError::TimeDiffTooBig { skew_secs: 90 })
        );
    }

    #[test]
    fn vega_time_ahead_passes() {
        let max = Duration::from_secs(60);
        assert_eq!(
            skew_within(at("2024-03-01T10:00:00Z"), at("2024-03-01T10:05:00Z"), max),
            Ok(())
        );
    }

    #[test]
    fn offsets_are_normalised() {
        let max = Duration::from_secs(60);
        assert_eq!(
            skew_within(at("2024-03-01T12:00:10+02:00"), at("2024-03-01T10:00:00Z"), max),
            Ok(())
        );
    }
}
