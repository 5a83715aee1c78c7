// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process job store.

use crate::store::{JobQuery, JobStore, StoreError};
use async_trait::async_trait;
use jw_core::{Checkpoint, Clock, Job, JobId, JobState, UserId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Job store backed by an ordered in-memory map.
///
/// Records are ordered by job id so paged `list` queries are stable.
#[derive(Clone)]
pub struct MemoryJobStore<C: Clock> {
    jobs: Arc<Mutex<BTreeMap<JobId, Job>>>,
    clock: C,
}

impl<C: Clock> MemoryJobStore<C> {
    pub fn new(clock: C) -> Self {
        Self { jobs: Arc::new(Mutex::new(BTreeMap::new())), clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert or replace a record verbatim.
    pub fn insert(&self, job: Job) {
        self.jobs.lock().insert(job.id.clone(), job);
    }

    /// Create a pending job for `user_id`.
    pub fn create(&self, user_id: UserId) -> JobId {
        let id = JobId::generate();
        self.insert(Job::new(id.clone(), user_id, self.clock.epoch_ms()));
        id
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Worker picks up a pending job.
    pub fn start(&self, id: &JobId) -> Result<(), StoreError> {
        self.transition(id, JobState::Running, |from| from == JobState::Pending)
    }

    /// Worker resumes a paused job from its checkpoint.
    pub fn resume(&self, id: &JobId) -> Result<(), StoreError> {
        self.transition(id, JobState::Running, |from| from == JobState::Paused)
    }

    pub fn complete(&self, id: &JobId) -> Result<(), StoreError> {
        self.transition(id, JobState::Completed, |from| from == JobState::Running)
    }

    pub fn cancel(&self, id: &JobId) -> Result<(), StoreError> {
        self.transition(id, JobState::Cancelled, |from| !from.is_terminal())
    }

    /// Worker saves resumable progress. Counts as a liveness signal.
    pub fn save_checkpoint(&self, id: &JobId, data: serde_json::Value) -> Result<(), StoreError> {
        let now = self.clock.epoch_ms();
        let mut jobs = self.jobs.lock();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if job.state != JobState::Running {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.state,
                to: JobState::Running,
            });
        }
        job.checkpoint = Some(Checkpoint::new(data, now));
        job.last_heartbeat_at_ms = now;
        job.updated_at_ms = now;
        Ok(())
    }

    fn transition(
        &self,
        id: &JobId,
        to: JobState,
        allowed: impl Fn(JobState) -> bool,
    ) -> Result<(), StoreError> {
        self.transition_with(id, to, allowed, |_| {})
    }

    fn transition_with(
        &self,
        id: &JobId,
        to: JobState,
        allowed: impl Fn(JobState) -> bool,
        apply: impl FnOnce(&mut Job),
    ) -> Result<(), StoreError> {
        let now = self.clock.epoch_ms();
        let mut jobs = self.jobs.lock();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if !allowed(job.state) {
            return Err(StoreError::InvalidTransition { id: id.clone(), from: job.state, to });
        }
        job.state = to;
        job.updated_at_ms = now;
        // Entering `running` restarts the liveness window
        if to == JobState::Running {
            job.last_heartbeat_at_ms = now;
        }
        apply(job);
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> JobStore for MemoryJobStore<C> {
    async fn find_stale_jobs(&self, threshold: Duration) -> Result<Vec<Job>, StoreError> {
        let now = self.clock.epoch_ms();
        let threshold_ms = threshold.as_millis() as u64;
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.is_stalled(now, threshold_ms))
            .cloned()
            .collect())
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.get(id))
    }

    async fn pause(&self, id: &JobId) -> Result<(), StoreError> {
        self.transition(id, JobState::Paused, |from| !from.is_terminal())
    }

    async fn mark_failed(&self, id: &JobId, reason: &str) -> Result<(), StoreError> {
        self.transition_with(
            id,
            JobState::Failed,
            |from| !from.is_terminal(),
            |job| job.failure_reason = Some(reason.to_string()),
        )
    }

    async fn list(&self, query: JobQuery) -> Result<Vec<Job>, StoreError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.state == query.state)
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn heartbeat(&self, id: &JobId) -> Result<(), StoreError> {
        let now = self.clock.epoch_ms();
        let mut jobs = self.jobs.lock();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if job.state != JobState::Running {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.state,
                to: JobState::Running,
            });
        }
        job.last_heartbeat_at_ms = now;
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
