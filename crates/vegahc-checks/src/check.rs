//! The health check abstraction and the context checks are built from.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use http::StatusCode;
use tokio::time::Instant;
use vegahc_probe::{ProbeClient, ProbeResponse};

use crate::error::{CheckError, Dependency};

/// Boxed future returned by [`HealthCheck::check`].
pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CheckError>> + Send + 'a>>;

/// A named health predicate evaluated once per scheduler cycle.
///
/// `check` takes `&mut self` so a check may keep private state between
/// cycles. That state belongs to the check instance alone.
pub trait HealthCheck: Send {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate the predicate. `Ok(())` means the check passed.
    fn check(&mut self) -> CheckFuture<'_>;

    /// Called by the scheduler before [`check`](Self::check) with the
    /// instant the cycle was scheduled for. Checks that compare
    /// observations across cycles time them by this instant rather than
    /// by when they happen to run within the cycle.
    fn begin_cycle(&mut self, _started: Instant) {}
}

/// Limits that turn a probe outcome into a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Responses slower than this are reported as too slow.
    pub slow_request: Duration,
    /// Maximum number of blocks the data node may trail core by.
    pub max_data_node_lag: u64,
    /// Maximum amount vega time may trail the core wall clock by.
    pub max_time_diff: Duration,
    /// Block heights below this are treated as a chain that is not running.
    pub min_block_height: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slow_request: Duration::from_secs(3),
            max_data_node_lag: 50,
            max_time_diff: Duration::from_secs(60),
            min_block_height: 100,
        }
    }
}

/// Everything a check constructor captures besides its target URLs.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    pub client: ProbeClient,
    pub thresholds: Thresholds,
}

impl CheckContext {
    pub fn new(client: ProbeClient, thresholds: Thresholds) -> Self {
        Self { client, thresholds }
    }
}

/// Join a base URL and an absolute path, tolerating a trailing slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Judge a response that arrived: slow first, then status.
pub(crate) fn judge_response(
    response: &ProbeResponse,
    slow_request: Duration,
    offline: CheckError,
    too_slow: CheckError,
) -> Result<(), CheckError> {
    if response.duration > slow_request {
        return Err(too_slow);
    }
    if response.status != StatusCode::OK {
        return Err(offline);
    }
    Ok(())
}

/// Parse a string-encoded block height reported by core.
pub(crate) fn parse_height(raw: &str) -> Result<u64, CheckError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| CheckError::InvalidResponse(Dependency::Core))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, duration: Duration) -> ProbeResponse {
        ProbeResponse {
            status,
            duration,
            headers: http::HeaderMap::new(),
            body: Default::default(),
        }
    }

    fn judge(resp: &ProbeResponse) -> Result<(), CheckError> {
        judge_response(
            resp,
            Duration::from_secs(3),
            CheckError::Offline(Dependency::Core),
            CheckError::TooSlow(Dependency::Core),
        )
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(endpoint("http://core:3003/", "/statistics"), "http://core:3003/statistics");
        assert_eq!(endpoint("http://core:3003", "/statistics"), "http://core:3003/statistics");
    }

    #[test]
    fn fast_ok_passes() {
        assert_eq!(judge(&response(StatusCode::OK, Duration::from_millis(20))), Ok(()));
    }

    #[test]
    fn slow_beats_bad_status() {
        let resp = response(StatusCode::BAD_GATEWAY, Duration::from_secs(4));
        assert_eq!(judge(&resp), Err(CheckError::TooSlow(Dependency::Core)));
    }

    #[test]
    fn non_200_is_offline() {
        let resp = response(StatusCode::NO_CONTENT, Duration::from_millis(5));
        assert_eq!(judge(&resp), Err(CheckError::Offline(Dependency::Core)));
    }

    #[test]
    fn exactly_at_threshold_is_not_slow() {
        let resp = response(StatusCode::OK, Duration::from_secs(3));
        assert_eq!(judge(&resp), Ok(()));
    }

    #[test]
    fn block_heights_parse_or_invalid() {
        assert_eq!(parse_height("1000"), Ok(1000));
        assert_eq!(
            parse_height(""),
            Err(CheckError::InvalidResponse(Dependency::Core))
        );
        assert_eq!(
            parse_height("-4"),
            Err(CheckError::InvalidResponse(Dependency::Core))
        );
    }

    #[test]
    fn default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.slow_request, Duration::from_secs(3));
        assert_eq!(t.max_data_node_lag, 50);
        assert_eq!(t.max_time_diff, Duration::from_secs(60));
        assert_eq!(t.min_block_height, 100);
    }
}
