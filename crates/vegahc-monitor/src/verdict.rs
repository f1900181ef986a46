//! The aggregated result of one check cycle.

use serde::Serialize;
use vegahc_checks::CheckError;

/// Overall health of the monitored deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// No cycle has completed yet.
    Unknown,
    Healthy,
    Unhealthy,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Healthy => "HEALTHY",
            Status::Unhealthy => "UNHEALTHY",
        }
    }
}

/// One cycle's verdict. `Healthy` exactly when `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    status: Status,
    reasons: Vec<CheckError>,
}

impl CheckResult {
    /// The verdict held before the first cycle completes.
    pub fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            reasons: Vec::new(),
        }
    }

    /// Build a verdict from the failures collected in one cycle.
    pub fn from_reasons(reasons: Vec<CheckError>) -> Self {
        let status = if reasons.is_empty() {
            Status::Healthy
        } else {
            Status::Unhealthy
        };
        Self { status, reasons }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn reasons(&self) -> &[CheckError] {
        &self.reasons
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Status::Healthy
    }
}

impl Default for CheckResult {
    fn default() -> Self {
        Self::unknown()
    }
}
