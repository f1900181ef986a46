//! vegahc-checks — health predicates for a Vega deployment.
//!
//! Each check probes one or more dependencies (core, data node, block
//! explorer) and either passes or returns a [`CheckError`] naming the
//! dependency and the failure mode. Checks are built once at startup and
//! evaluated every scheduler cycle.
//!
//! # Checks
//!
//! | Name | Constructor | Passes when |
//! |---|---|---|
//! | `core-online` | [`core_online`] | `GET {core}/statistics` is 200 within the slow threshold |
//! | `data-node-online` | [`data_node_online`] | `GET {data-node}/api/v2/info` is 200 within the slow threshold |
//! | `explorer-online` | [`explorer_online`] | `GET {explorer}/rest/info` is 200 within the slow threshold |
//! | `block-increase` | [`block_increase`], [`block_increase_blocking`] | core height is ≥ 100 and grew between two probes |
//! | `data-node-lag` | [`data_node_lag`] | core height − data node height ≤ 50 |
//! | `explorer-transactions` | [`explorer_transactions`] | explorer lists at least one transaction |
//! | `clock-skew` | [`clock_skew`] | core wall clock − vega time ≤ 60s |
//!
//! # Error classification
//!
//! A probe that could not decode its JSON body maps to
//! [`CheckError::InvalidResponse`]; any other probe failure maps to
//! [`CheckError::Offline`]. A probe that answered maps to
//! [`CheckError::TooSlow`] when it exceeded the slow threshold and to
//! [`CheckError::Offline`] when the status is not 200.

pub mod block;
pub mod check;
pub mod clock;
pub mod error;
pub mod explorer;
pub mod lag;
pub mod online;
pub mod types;

pub use block::{block_increase, block_increase_blocking, BlockIncrease, BlockIncreaseBlocking};
pub use check::{CheckContext, CheckFuture, HealthCheck, Thresholds};
pub use clock::{clock_skew, ClockSkew};
pub use error::{CheckError, Dependency};
pub use explorer::{explorer_transactions, ExplorerTransactions};
pub use lag::{data_node_lag, DataNodeLag};
pub use online::{core_online, data_node_online, explorer_online, OnlineCheck};
pub use types::{StatisticsResponse, TransactionsResponse};
