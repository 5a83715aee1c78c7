// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting job store for tests.

use crate::memory::MemoryJobStore;
use crate::store::{JobQuery, JobStore, StoreError};
use async_trait::async_trait;
use jw_core::{FakeClock, Job, JobId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FindStale,
    Get(JobId),
    Pause(JobId),
    MarkFailed(JobId, String),
    List(JobQuery),
    Heartbeat(JobId),
}

/// Holds `get_job` calls until the test releases them.
#[derive(Clone)]
pub struct GetGate {
    /// Signalled once per `get_job` call that reaches the gate.
    pub entered: Arc<Notify>,
    release: Arc<Semaphore>,
}

impl GetGate {
    /// Let `n` held calls proceed.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }
}

#[derive(Default)]
struct Faults {
    fail_next_scan: bool,
    fail_writes: bool,
    fail_get: HashSet<JobId>,
    vanish_after_scan: HashSet<JobId>,
    gate: Option<GetGate>,
}

/// [`MemoryJobStore`] on a [`FakeClock`] with fault injection and a call log.
#[derive(Clone)]
pub struct FakeJobStore {
    memory: MemoryJobStore<FakeClock>,
    faults: Arc<Mutex<Faults>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl FakeJobStore {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            memory: MemoryJobStore::new(clock),
            faults: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Backing store, for setup and worker-side transitions.
    pub fn memory(&self) -> &MemoryJobStore<FakeClock> {
        &self.memory
    }

    pub fn clock(&self) -> &FakeClock {
        self.memory.clock()
    }

    pub fn insert(&self, job: Job) {
        self.memory.insert(job);
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        self.memory.get(&JobId::new(id))
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded `pause`/`mark_failed` calls.
    pub fn write_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, StoreCall::Pause(_) | StoreCall::MarkFailed(..)))
            .count()
    }

    pub fn fail_next_scan(&self) {
        self.faults.lock().fail_next_scan = true;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.faults.lock().fail_writes = fail;
    }

    pub fn fail_get_for(&self, id: &str) {
        self.faults.lock().fail_get.insert(JobId::new(id));
    }

    /// Delete the job right after the next scan reports it.
    pub fn vanish_after_scan(&self, id: &str) {
        self.faults.lock().vanish_after_scan.insert(JobId::new(id));
    }

    /// Gate subsequent `get_job` calls until released.
    pub fn gate_gets(&self) -> GetGate {
        let gate =
            GetGate { entered: Arc::new(Notify::new()), release: Arc::new(Semaphore::new(0)) };
        self.faults.lock().gate = Some(gate.clone());
        gate
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.faults.lock().fail_writes {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn find_stale_jobs(&self, threshold: Duration) -> Result<Vec<Job>, StoreError> {
        self.record(StoreCall::FindStale);
        let vanish = {
            let mut faults = self.faults.lock();
            if std::mem::take(&mut faults.fail_next_scan) {
                return Err(StoreError::Unavailable("injected scan failure".to_string()));
            }
            std::mem::take(&mut faults.vanish_after_scan)
        };
        let stale = self.memory.find_stale_jobs(threshold).await?;
        for id in &vanish {
            self.memory.remove(id);
        }
        Ok(stale)
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        self.record(StoreCall::Get(id.clone()));
        let (failing, gate) = {
            let faults = self.faults.lock();
            (faults.fail_get.contains(id), faults.gate.clone())
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            if let Ok(permit) = gate.release.acquire().await {
                permit.forget();
            }
        }
        if failing {
            return Err(StoreError::Unavailable(format!("injected get failure for {id}")));
        }
        self.memory.get_job(id).await
    }

    async fn pause(&self, id: &JobId) -> Result<(), StoreError> {
        self.record(StoreCall::Pause(id.clone()));
        self.check_writes()?;
        self.memory.pause(id).await
    }

    async fn mark_failed(&self, id: &JobId, reason: &str) -> Result<(), StoreError> {
        self.record(StoreCall::MarkFailed(id.clone(), reason.to_string()));
        self.check_writes()?;
        self.memory.mark_failed(id, reason).await
    }

    async fn list(&self, query: JobQuery) -> Result<Vec<Job>, StoreError> {
        self.record(StoreCall::List(query));
        self.memory.list(query).await
    }

    async fn heartbeat(&self, id: &JobId) -> Result<(), StoreError> {
        self.record(StoreCall::Heartbeat(id.clone()));
        self.memory.heartbeat(id).await
    }
}
