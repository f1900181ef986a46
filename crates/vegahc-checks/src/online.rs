//! Reachability checks: is the dependency answering 200, quickly, with JSON.

use std::time::Duration;

use serde::de::IgnoredAny;
use tracing::warn;
use vegahc_probe::ProbeClient;

use crate::check::{endpoint, judge_response, CheckContext, CheckFuture, HealthCheck};
use crate::error::{CheckError, Dependency};

/// Probes one endpoint of one dependency.
#[derive(Debug)]
pub struct OnlineCheck {
    name: &'static str,
    url: String,
    dependency: Dependency,
    client: ProbeClient,
    slow_request: Duration,
    /// What a slow answer is reported as.
    too_slow: CheckError,
}

impl OnlineCheck {
    async fn evaluate(&self) -> Result<(), CheckError> {
        let response = self.client.get(&self.url).await.map_err(|e| {
            warn!(check = self.name, url = %self.url, error = %e, "probe failed");
            CheckError::from_probe(self.dependency, &e)
        })?;

        judge_response(
            &response,
            self.slow_request,
            CheckError::Offline(self.dependency),
            self.too_slow.clone(),
        )?;

        // The payload is not inspected, but it has to be JSON.
        serde_json::from_slice::<IgnoredAny>(&response.body).map_err(|e| {
            warn!(check = self.name, url = %self.url, error = %e, "response is not json");
            CheckError::InvalidResponse(self.dependency)
        })?;

        Ok(())
    }
}

impl HealthCheck for OnlineCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }
}

/// `GET {core}/statistics` answers 200 within the slow threshold.
pub fn core_online(core_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(OnlineCheck {
        name: "core-online",
        url: endpoint(core_url, "/statistics"),
        dependency: Dependency::Core,
        client: ctx.client.clone(),
        slow_request: ctx.thresholds.slow_request,
        too_slow: CheckError::TooSlow(Dependency::Core),
    })
}

/// `GET {data-node}/api/v2/info` answers 200 within the slow threshold.
pub fn data_node_online(data_node_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(OnlineCheck {
        name: "data-node-online",
        url: endpoint(data_node_url, "/api/v2/info"),
        dependency: Dependency::DataNode,
        client: ctx.client.clone(),
        slow_request: ctx.thresholds.slow_request,
        too_slow: CheckError::TooSlow(Dependency::DataNode),
    })
}

/// `GET {explorer}/rest/info` answers 200 within the slow threshold.
///
/// A slow explorer is reported as an invalid response.
pub fn explorer_online(explorer_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(OnlineCheck {
        name: "explorer-online",
        url: endpoint(explorer_url, "/rest/info"),
        dependency: Dependency::BlockExplorer,
        client: ctx.client.clone(),
        slow_request: ctx.thresholds.slow_request,
        too_slow: CheckError::InvalidResponse(Dependency::BlockExplorer),
    })
}
