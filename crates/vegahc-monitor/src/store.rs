//! The shared cell holding the latest verdict.
//!
//! [`ResultStore`] is the read side and may be cloned into any number of
//! HTTP handlers. [`StoreWriter`] is the only write side; it is not
//! `Clone`, so whichever task owns it is the single writer.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::verdict::CheckResult;

/// Read handle to the latest verdict.
#[derive(Debug, Clone)]
pub struct ResultStore {
    inner: Arc<RwLock<CheckResult>>,
}

/// Write handle to the latest verdict.
#[derive(Debug)]
pub struct StoreWriter {
    inner: Arc<RwLock<CheckResult>>,
}

/// Create a store holding `Unknown`, plus its single writer.
pub fn result_store() -> (ResultStore, StoreWriter) {
    let inner = Arc::new(RwLock::new(CheckResult::unknown()));
    (
        ResultStore {
            inner: inner.clone(),
        },
        StoreWriter { inner },
    )
}

impl ResultStore {
    /// Snapshot of the latest verdict.
    pub async fn latest(&self) -> CheckResult {
        self.inner.read().await.clone()
    }
}

impl StoreWriter {
    /// Replace the stored verdict as a whole.
    pub async fn replace(&self, result: CheckResult) {
        *self.inner.write().await = result;
    }
}
