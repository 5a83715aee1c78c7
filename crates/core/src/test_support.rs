// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Checkpoint, Job, JobState};
use serde_json::json;

/// Proptest strategies for core types.
pub mod strategies {
    use crate::job::JobState;
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Pending),
            Just(JobState::Running),
            Just(JobState::Paused),
            Just(JobState::Completed),
            Just(JobState::Failed),
            Just(JobState::Cancelled),
        ]
    }

    pub fn arb_non_terminal_state() -> impl Strategy<Value = JobState> {
        prop_oneof![Just(JobState::Pending), Just(JobState::Running), Just(JobState::Paused)]
    }
}

/// Running job owned by `usr-test` with a checkpoint and the given heartbeat.
pub fn running_job_with_checkpoint(id: &str, heartbeat_ms: u64) -> Job {
    Job::builder()
        .id(id)
        .state(JobState::Running)
        .last_heartbeat_at_ms(heartbeat_ms)
        .checkpoint(Checkpoint::new(json!({ "cursor": 1 }), heartbeat_ms))
        .build()
}

/// Running job owned by `usr-test` without a checkpoint.
pub fn running_job(id: &str, heartbeat_ms: u64) -> Job {
    Job::builder()
        .id(id)
        .state(JobState::Running)
        .last_heartbeat_at_ms(heartbeat_ms)
        .build()
}
