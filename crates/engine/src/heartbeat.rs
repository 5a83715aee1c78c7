// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-side liveness signal.
//!
//! A worker holds a [`Heartbeat`] for as long as it executes a job. Beats
//! must arrive more often than the supervisor's stall threshold; see
//! [`SupervisorConfig::heartbeat_interval`](crate::SupervisorConfig::heartbeat_interval).

use jw_adapters::{JobStore, StoreError};
use jw_core::JobId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodically asserts liveness for one job until dropped.
pub struct Heartbeat {
    job_id: JobId,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Beat immediately, then every `interval`.
    ///
    /// Beating stops by itself once the store reports the job missing or no
    /// longer running (paused by the supervisor, completed, cancelled).
    pub fn spawn(store: Arc<dyn JobStore>, job_id: JobId, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(beat(store, job_id.clone(), interval, cancel.clone()));
        Self { job_id, cancel, handle: Some(handle) }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Whether the beat loop has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop beating and wait for the loop to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(job_id = %self.job_id, error = %e, "heartbeat task failed");
            }
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn beat(
    store: Arc<dyn JobStore>,
    job_id: JobId,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        match store.heartbeat(&job_id).await {
            Ok(()) => {}
            Err(e @ (StoreError::NotFound(_) | StoreError::InvalidTransition { .. })) => {
                tracing::debug!(job_id = %job_id, reason = %e, "heartbeat ended");
                break;
            }
            Err(e) => tracing::warn!(job_id = %job_id, error = %e, "heartbeat write failed"),
        }
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
