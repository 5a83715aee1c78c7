// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle events published on the pub/sub bus.

use crate::id::{JobId, UserId};
use crate::recovery::{RecoveryEvent, RecoveryStatus};
use serde::{Deserialize, Serialize};

/// Kind tag of a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEventKind {
    JobCreated,
    JobStarted,
    JobProgress,
    JobPaused,
    JobResumed,
    JobCompleted,
    JobFailed,
    JobCancelled,
}

impl LifecycleEventKind {
    pub const ALL: [LifecycleEventKind; 8] = [
        LifecycleEventKind::JobCreated,
        LifecycleEventKind::JobStarted,
        LifecycleEventKind::JobProgress,
        LifecycleEventKind::JobPaused,
        LifecycleEventKind::JobResumed,
        LifecycleEventKind::JobCompleted,
        LifecycleEventKind::JobFailed,
        LifecycleEventKind::JobCancelled,
    ];

    /// Event name used when this kind is forwarded to a user's room.
    pub fn room_event(self) -> &'static str {
        match self {
            LifecycleEventKind::JobCreated => "job:created",
            LifecycleEventKind::JobStarted => "job:started",
            LifecycleEventKind::JobProgress => "job:progress",
            LifecycleEventKind::JobPaused => "job:paused",
            LifecycleEventKind::JobResumed => "job:resumed",
            LifecycleEventKind::JobCompleted => "job:completed",
            LifecycleEventKind::JobFailed => "job:failed",
            LifecycleEventKind::JobCancelled => "job:cancelled",
        }
    }
}

crate::simple_display! {
    LifecycleEventKind {
        JobCreated => "JOB_CREATED",
        JobStarted => "JOB_STARTED",
        JobProgress => "JOB_PROGRESS",
        JobPaused => "JOB_PAUSED",
        JobResumed => "JOB_RESUMED",
        JobCompleted => "JOB_COMPLETED",
        JobFailed => "JOB_FAILED",
        JobCancelled => "JOB_CANCELLED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    #[serde(rename = "type")]
    pub kind: LifecycleEventKind,
    pub job_id: JobId,
    pub user_id: UserId,
    pub data: serde_json::Value,
    pub timestamp: u64,
}

impl LifecycleEvent {
    /// Failed recoveries publish `JOB_FAILED`; pauses publish `JOB_PROGRESS`
    /// so progress listeners see the job leave `running`.
    pub fn from_recovery(event: &RecoveryEvent) -> Self {
        let kind = match event.status {
            RecoveryStatus::Failed => LifecycleEventKind::JobFailed,
            RecoveryStatus::Paused => LifecycleEventKind::JobProgress,
        };
        Self {
            kind,
            job_id: event.job_id.clone(),
            user_id: event.user_id.clone(),
            data: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
            timestamp: event.timestamp,
        }
    }
}

/// Room scoped to one user's sessions.
pub fn user_room(user_id: &UserId) -> String {
    format!("user:{user_id}")
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
