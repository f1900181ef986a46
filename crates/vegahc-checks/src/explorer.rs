//! Block explorer content check.

use tracing::warn;
use vegahc_probe::ProbeClient;

use crate::check::{endpoint, CheckContext, CheckFuture, HealthCheck};
use crate::error::{CheckError, Dependency};
use crate::types::TransactionsResponse;

#[derive(Debug)]
pub struct ExplorerTransactions {
    url: String,
    client: ProbeClient,
}

impl ExplorerTransactions {
    async fn evaluate(&self) -> Result<(), CheckError> {
        let (_, body) = self
            .client
            .get_json::<TransactionsResponse>(&self.url)
            .await
            .map_err(|e| {
                warn!(check = "explorer-transactions", url = %self.url, error = %e, "probe failed");
                CheckError::from_probe(Dependency::BlockExplorer, &e)
            })?;

        if body.transactions.is_empty() {
            return Err(CheckError::NoTransactions);
        }
        Ok(())
    }
}

impl HealthCheck for ExplorerTransactions {
    fn name(&self) -> &'static str {
        "explorer-transactions"
    }

    fn check(&mut self) -> CheckFuture<'_> {
        Box::pin(self.evaluate())
    }
}

/// `GET {explorer}/rest/transactions` lists at least one transaction.
pub fn explorer_transactions(explorer_url: &str, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    Box::new(ExplorerTransactions {
        url: endpoint(explorer_url, "/rest/transactions"),
        client: ctx.client.clone(),
    })
}
