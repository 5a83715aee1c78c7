// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job persistence contract consumed by the supervisor.

use async_trait::async_trait;
use jw_core::{Job, JobId, JobState};
use std::time::Duration;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job {id}: cannot transition from {from} to {to}")]
    InvalidTransition { id: JobId, from: JobState, to: JobState },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Paged query by state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobQuery {
    pub state: JobState,
    pub limit: usize,
    pub offset: usize,
}

impl JobQuery {
    pub fn new(state: JobState, limit: usize) -> Self {
        Self { state, limit, offset: 0 }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Durable job records shared between workers and the supervisor.
///
/// The store is externally synchronized: workers write heartbeats and state
/// concurrently with the supervisor, so callers must not cache records
/// across suspension points.
#[async_trait]
pub trait JobStore: Send + Sync + 'static {
    /// Running jobs whose last heartbeat is older than `threshold`.
    async fn find_stale_jobs(&self, threshold: Duration) -> Result<Vec<Job>, StoreError>;

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError>;

    /// Move a non-terminal job to `paused`.
    async fn pause(&self, id: &JobId) -> Result<(), StoreError>;

    /// Move a non-terminal job to `failed`, recording `reason`.
    async fn mark_failed(&self, id: &JobId, reason: &str) -> Result<(), StoreError>;

    async fn list(&self, query: JobQuery) -> Result<Vec<Job>, StoreError>;

    /// Worker liveness signal for a running job.
    async fn heartbeat(&self, id: &JobId) -> Result<(), StoreError>;
}
