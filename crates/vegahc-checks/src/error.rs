//! Error taxonomy for health checks.
//!
//! Errors are scoped per dependency and per failure mode so that one
//! verdict can carry several independent, diagnosable reasons.

use std::fmt;

use thiserror::Error;
use vegahc_probe::ProbeError;

/// A monitored dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Core,
    DataNode,
    BlockExplorer,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dependency::Core => "core",
            Dependency::DataNode => "data node",
            Dependency::BlockExplorer => "block explorer",
        };
        f.write_str(name)
    }
}

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("{0} http endpoint is not online")]
    Offline(Dependency),

    #[error("invalid response from {0}")]
    InvalidResponse(Dependency),

    #[error("http request to {0} took too long")]
    TooSlow(Dependency),

    #[error("data node is lagging behind core by {lag} blocks")]
    DataNodeLagging { lag: u64 },

    #[error("block explorer returns empty list of the transactions")]
    NoTransactions,

    #[error("block did not increase (previous {previous}, current {current})")]
    BlockDidNotIncrease { previous: u64, current: u64 },

    #[error("block increase check is initializing")]
    Initializing,

    #[error("failed to parse current time from statistics endpoint")]
    CurrentTimeParse,

    #[error("failed to parse vega time from statistics endpoint")]
    VegaTimeParse,

    #[error("core time is too far in the past ({skew_secs}s behind)")]
    TimeDiffTooBig { skew_secs: u64 },
}

impl CheckError {
    /// Map a failed probe of `dependency` to a check error.
    pub fn from_probe(dependency: Dependency, err: &ProbeError) -> Self {
        if err.is_decode() {
            CheckError::InvalidResponse(dependency)
        } else {
            CheckError::Offline(dependency)
        }
    }
}
