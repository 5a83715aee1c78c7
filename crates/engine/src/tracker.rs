// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job recovery attempt counts.
//!
//! Counts live only in memory. A restarted supervisor starts from zero for
//! every job, which can re-grant attempts but can never wedge a job.

use jw_core::JobId;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    count: u32,
    last_attempt_at_ms: u64,
}

/// Recovery attempts per job since the last reset or terminal transition.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    entries: HashMap<JobId, Entry>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count, zero when the job has never been recovered.
    pub fn get(&self, id: &JobId) -> u32 {
        self.entries.get(id).map_or(0, |e| e.count)
    }

    /// When the last recovery attempt of `id` happened, if any.
    pub fn last_attempt_at_ms(&self, id: &JobId) -> Option<u64> {
        self.entries.get(id).map(|e| e.last_attempt_at_ms)
    }

    /// Record an attempt made at `now_ms` and return the new count.
    pub fn increment(&mut self, id: &JobId, now_ms: u64) -> u32 {
        let entry = self.entries.entry(id.clone()).or_default();
        entry.count = entry.count.saturating_add(1);
        entry.last_attempt_at_ms = now_ms;
        entry.count
    }

    /// Drop the entry because the job finished. Returns whether one existed.
    pub fn delete(&mut self, id: &JobId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Operator override: forget all attempts for `id`.
    pub fn reset(&mut self, id: &JobId) -> bool {
        let existed = self.delete(id);
        if existed {
            tracing::info!(job_id = %id, "recovery attempts reset");
        }
        existed
    }

    /// Snapshot of every tracked job, ordered by id.
    pub fn list_all(&self) -> BTreeMap<JobId, u32> {
        self.entries.iter().map(|(id, e)| (id.clone(), e.count)).collect()
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
