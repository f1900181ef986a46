//! Data node lag: how far the data node's indexed height trails core.

use tracing::warn;
use vegahc_probe::ProbeClient;

use crate::check::{endpoint, parse_height, CheckContext, CheckFuture, HealthCheck};
use crate::error::{CheckError, Dependency};
use crate::types::StatisticsResponse;

/// Response header carrying the data node's block height.
pub const BLOCK_HEIGHT_HEADER: &str = "x-block-height";

#[derive(Debug)]
pub struct DataNodeLag {
    statistics_url: String,
    info_url: String,
    client: ProbeClient,
    max_lag: u64,
}

impl DataNodeLag {
    async fn evaluate(&self) -> Result<(), CheckError> {
        let (_, stats) = self
            .client
            .get_json::<StatisticsResponse>(&self.statistics_url)
            .await
            .map_err(|e| {
                warn!(check = "data-node-lag", url = %self.statistics_url, error = %e, "core probe failed");
                CheckError::from_probe(Dependency::Core, &e)
            })?;
        let core_height = parse_height(&stats.statistics.block_height)?;

        let response = self.client.get(&self.info_url).await.map_err(|e| {
            warn!(check = "data-node-lag", url = %self.info_url, error = %e, "data node probe failed");
            CheckError::from_probe(Dependency::DataNode, &e)
        })?;

        // A missing or garbled height header is reported against core, the
        // side whose height the lag is measured from.
        let Some(raw) = response.header_str(BLOCK_HEIGHT_HEADER) else {
            warn!(check = "data-node-lag", url = %self.info_url, "missing block height header");
            return Err(CheckError::InvalidResponse(Dependency::Core));
        };
        let data_node_height = parse_height(raw).inspect_err(|_| {
            warn!(check = "data-node-lag", header = raw, "unparsable block height header");
        })?;

        let lag = core_height.saturating_sub(data_node_height);
        if lag > self.max_lag {
            return Err(CheckError::DataNodeLagging { lag });
        }
        Ok(())
    }
}

impl HealthCheck for DataNodeLag {
    fn name(&self) -> &'static str {
        "data-node-lag"
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }
}

/// Core height minus the data node's `x-block-height` stays within the lag threshold.
pub fn data_node_lag(core_url: &str, data_node_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(DataNodeLag {
        statistics_url: endpoint(core_url, "/statistics"),
        info_url: endpoint(data_node_url, "/api/v2/info"),
        client: ctx.client.clone(),
        max_lag: ctx.thresholds.max_data_node_lag,
    })
}
