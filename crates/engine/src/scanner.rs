// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-job scanning.

use jw_adapters::JobStore;
use jw_core::Job;
use std::sync::Arc;
use std::time::Duration;

/// Asks the store for running jobs whose heartbeat is older than the threshold.
#[derive(Clone)]
pub struct Scanner {
    store: Arc<dyn JobStore>,
    threshold: Duration,
}

impl Scanner {
    pub fn new(store: Arc<dyn JobStore>, threshold: Duration) -> Self {
        Self { store, threshold }
    }

    /// One poll. A failed poll yields nothing; the next tick polls again.
    pub async fn scan(&self) -> Vec<Job> {
        match self.store.find_stale_jobs(self.threshold).await {
            Ok(jobs) => {
                if !jobs.is_empty() {
                    tracing::info!(count = jobs.len(), "found stalled jobs");
                }
                jobs
            }
            Err(e) => {
                tracing::warn!(error = %e, "stale job scan failed, retrying next tick");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
