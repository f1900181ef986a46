//! vegahc-monitor — runs the health checks and keeps the latest verdict.
//!
//! # Architecture
//!
//! ```text
//! HealthMonitor::start()
//!   ├── check loop task
//!   │   ├── tick (immediately, then every interval)
//!   │   ├── run_cycle() → CheckResult
//!   │   └── send on mpsc(1)  ── blocks while the slot is full
//!   └── forwarder task
//!       └── recv → StoreWriter::replace()
//!
//! ResultStore (Arc<RwLock<CheckResult>>)
//!   └── latest() ← HTTP handlers
//! ```
//!
//! Both tasks watch the same shutdown channel and exit on their own when
//! it fires. The forwarder is the only holder of the [`StoreWriter`].

pub mod forwarder;
pub mod monitor;
pub mod scheduler;
pub mod store;
pub mod verdict;

pub use monitor::{HealthMonitor, MonitorHandle, DEFAULT_CHECK_INTERVAL};
pub use scheduler::{run_cycle, run_cycle_at};
pub use store::{result_store, ResultStore, StoreWriter};
pub use verdict::{CheckResult, Status};
