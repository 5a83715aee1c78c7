// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record as seen by the supervisor.
//!
//! The store owns these records. Workers write heartbeats and checkpoints
//! against them; the supervisor only reads them and requests the
//! `paused`/`failed` transitions.

use crate::id::{JobId, UserId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Terminal jobs never leave their state and are ignored by recovery.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }

    pub const TERMINAL: [JobState; 3] =
        [JobState::Completed, JobState::Failed, JobState::Cancelled];
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Resumable progress snapshot saved by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub data: serde_json::Value,
    pub saved_at_ms: u64,
}

impl Checkpoint {
    pub fn new(data: serde_json::Value, saved_at_ms: u64) -> Self {
        Self { data, saved_at_ms }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Checkpoint>,
    pub last_heartbeat_at_ms: u64,
    /// Set when the job is marked failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Job {
    /// New pending job whose heartbeat clock starts at creation.
    pub fn new(id: JobId, user_id: UserId, now_ms: u64) -> Self {
        Self {
            id,
            user_id,
            state: JobState::Pending,
            checkpoint: None,
            last_heartbeat_at_ms: now_ms,
            failure_reason: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Milliseconds since the last heartbeat. Saturates at zero if the
    /// heartbeat is ahead of `now_ms` (clock skew between writers).
    pub fn heartbeat_age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_heartbeat_at_ms)
    }

    /// A running job whose heartbeat is strictly older than `threshold_ms`.
    pub fn is_stalled(&self, now_ms: u64, threshold_ms: u64) -> bool {
        self.state == JobState::Running && self.heartbeat_age_ms(now_ms) > threshold_ms
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = "job-test",
            user_id: UserId = "usr-test",
        }
        set {
            state: JobState = JobState::Running,
            last_heartbeat_at_ms: u64 = 1_000_000,
            created_at_ms: u64 = 1_000_000,
            updated_at_ms: u64 = 1_000_000,
        }
        option {
            checkpoint: Checkpoint,
            failure_reason: String,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
