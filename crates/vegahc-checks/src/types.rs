//! JSON bodies consumed from the monitored dependencies.
//!
//! Missing fields decode to their empty defaults so that a partial body
//! is reported by the check that needs the field, not as a decode error.

use serde::Deserialize;

/// `GET {core}/statistics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatisticsResponse {
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statistics {
    /// String-encoded block height.
    pub block_height: String,
    /// Core wall clock, RFC3339.
    pub current_time: String,
    /// Time of the latest block, RFC3339.
    pub vega_time: String,
}

/// `GET {explorer}/rest/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub block: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_decode() {
        let body = r#"{
            "statistics": {
                "blockHeight": "1024",
                "currentTime": "2024-03-01T10:00:00.123456789Z",
                "vegaTime": "2024-03-01T09:59:59Z",
                "chainId": "vega-mainnet-0011"
            }
        }"#;
        let resp: StatisticsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.statistics.block_height, "1024");
        assert_eq!(resp.statistics.current_time, "2024-03-01T10:00:00.123456789Z");
        assert_eq!(resp.statistics.vega_time, "2024-03-01T09:59:59Z");
    }

    #[test]
    fn missing_statistics_fields_default_to_empty() {
        let resp: StatisticsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.statistics.block_height.is_empty());
    }

    #[test]
    fn transactions_decode() {
        let body = r#"{"transactions":[{"block":"12","hash":"ab"},{"block":"13"}]}"#;
        let resp: TransactionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.transactions.len(), 2);
        assert_eq!(resp.transactions[1].block, "13");
    }
}
