// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use serde_json::json;

#[yare::parameterized(
    pending   = { JobState::Pending,   false },
    running   = { JobState::Running,   false },
    paused    = { JobState::Paused,    false },
    completed = { JobState::Completed, true },
    failed    = { JobState::Failed,    true },
    cancelled = { JobState::Cancelled, true },
)]
fn terminal_states(state: JobState, terminal: bool) {
    assert_eq!(state.is_terminal(), terminal);
    assert_eq!(JobState::TERMINAL.contains(&state), terminal);
}

#[test]
fn state_display_matches_serde() {
    for state in [JobState::Pending, JobState::Paused, JobState::Cancelled] {
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, format!("\"{state}\""));
    }
}

#[test]
fn new_job_is_pending_with_fresh_heartbeat() {
    let job = Job::new(JobId::new("job-1"), UserId::new("usr-1"), 5_000);
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.last_heartbeat_at_ms, 5_000);
    assert!(!job.has_checkpoint());
}

#[test]
fn stalled_requires_running_state() {
    let job = Job::builder().state(JobState::Paused).last_heartbeat_at_ms(0).build();
    assert!(!job.is_stalled(100_000, 30_000));
}

#[test]
fn stall_threshold_is_exclusive() {
    let job = Job::builder().last_heartbeat_at_ms(10_000).build();
    assert!(!job.is_stalled(40_000, 30_000));
    assert!(job.is_stalled(40_001, 30_000));
}

#[test]
fn heartbeat_in_future_has_zero_age() {
    let job = Job::builder().last_heartbeat_at_ms(50_000).build();
    assert_eq!(job.heartbeat_age_ms(40_000), 0);
}

#[test]
fn serialization_skips_absent_checkpoint() {
    let job = Job::builder().build();
    let value = serde_json::to_value(&job).unwrap();
    assert!(value.get("checkpoint").is_none());

    let job = Job::builder().checkpoint(Checkpoint::new(json!({"page": 3}), 7)).build();
    let value = serde_json::to_value(&job).unwrap();
    assert_eq!(value["checkpoint"]["data"]["page"], 3);
}

proptest! {
    #[test]
    fn stalled_iff_running_and_older_than_threshold(
        heartbeat in 0u64..1_000_000,
        now in 0u64..2_000_000,
        threshold in 0u64..100_000,
        state in crate::test_support::strategies::arb_job_state(),
    ) {
        let job = Job::builder().state(state).last_heartbeat_at_ms(heartbeat).build();
        let expected = state == JobState::Running && now.saturating_sub(heartbeat) > threshold;
        prop_assert_eq!(job.is_stalled(now, threshold), expected);
    }
}
