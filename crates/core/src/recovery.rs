// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery outcome notifications.

use crate::id::{JobId, UserId};
use serde::{Deserialize, Serialize};

/// Room event name carrying [`RecoveryEvent`] payloads.
pub const RECOVERY_ROOM_EVENT: &str = "job:recovery";

/// Failure reason when a job keeps stalling after every resume.
pub const REASON_MAX_ATTEMPTS: &str = "max recovery attempts exceeded";

/// Failure reason when a stalled job saved no checkpoint.
pub const REASON_NO_CHECKPOINT: &str = "no checkpoint available";

/// Reason attached to paused outcomes.
pub const REASON_STALLED: &str = "heartbeat stalled; paused for resume from checkpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Paused,
    Failed,
}

crate::simple_display! {
    RecoveryStatus {
        Paused => "paused",
        Failed => "failed",
    }
}

/// Transient notification describing what recovery did to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryEvent {
    pub job_id: JobId,
    pub user_id: UserId,
    pub status: RecoveryStatus,
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub reason: String,
    /// Present on paused outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<bool>,
    /// Attempt count after a pause, or at the time of failure.
    pub attempts: u32,
}

impl RecoveryEvent {
    pub fn paused(job_id: JobId, user_id: UserId, attempts: u32, timestamp: u64) -> Self {
        Self {
            job_id,
            user_id,
            status: RecoveryStatus::Paused,
            timestamp,
            reason: REASON_STALLED.to_string(),
            checkpoint: Some(true),
            attempts,
        }
    }

    pub fn failed(
        job_id: JobId,
        user_id: UserId,
        reason: impl Into<String>,
        attempts: u32,
        timestamp: u64,
    ) -> Self {
        Self {
            job_id,
            user_id,
            status: RecoveryStatus::Failed,
            timestamp,
            reason: reason.into(),
            checkpoint: None,
            attempts,
        }
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
