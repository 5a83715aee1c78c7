// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;
use jw_core::Job;

#[tokio::test]
async fn only_running_jobs_past_the_threshold_are_stale() {
    let w = World::new();
    let now = w.now();
    let threshold = w.supervisor.config().stalled_ms();
    let cases = [
        ("job-fresh", JobState::Running, now),
        ("job-edge", JobState::Running, now - threshold),
        ("job-over", JobState::Running, now - threshold - 1),
        ("job-old", JobState::Running, 0),
        ("job-paused", JobState::Paused, 0),
        ("job-pending", JobState::Pending, 0),
        ("job-done", JobState::Completed, 0),
    ];
    for (id, state, heartbeat) in cases {
        w.store.insert(
            Job::builder()
                .id(id)
                .state(state)
                .last_heartbeat_at_ms(heartbeat)
                .build(),
        );
    }

    let report = w.tick().await;

    assert_eq!(report.stale, 2);
    let touched: Vec<_> = w
        .recovery_events()
        .into_iter()
        .map(|e| e.job_id)
        .collect();
    assert_eq!(touched.len(), 2);
    assert!(touched.iter().any(|id| id == "job-over"));
    assert!(touched.iter().any(|id| id == "job-old"));
    assert_eq!(w.state("job-fresh"), JobState::Running);
    assert_eq!(w.state("job-edge"), JobState::Running);
}

#[tokio::test]
async fn checkpointed_recovery_pauses_and_counts_once() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));

    assert_eq!(w.trigger("job-1").await, RecoveryOutcome::Paused { attempts: 1 });
    assert_eq!(w.state("job-1"), JobState::Paused);
    assert_eq!(w.attempts("job-1"), Some(1));
}

#[tokio::test]
async fn missing_checkpoint_fails_regardless_of_prior_attempts() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.trigger("job-1").await;
    assert_eq!(w.attempts("job-1"), Some(1));

    // Worker restarts from scratch and loses its checkpoint.
    w.store.insert(running_job("job-1", 0));
    w.stall();
    let outcome = w.trigger("job-1").await;

    assert_eq!(
        outcome,
        RecoveryOutcome::Failed { reason: REASON_NO_CHECKPOINT.to_string(), attempts: 1 }
    );
    assert_eq!(w.state("job-1"), JobState::Failed);
    assert_eq!(w.attempts("job-1"), None);
}

#[tokio::test]
async fn exhausted_job_is_left_alone_afterwards() {
    let w = World::with_config(SupervisorConfig::default().max_recovery_attempts(1));
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.tick().await;
    w.resume("job-1");
    w.stall();
    w.tick().await;
    assert_eq!(w.state("job-1"), JobState::Failed);
    let writes = w.store.write_count();

    w.stall();
    assert_eq!(w.tick().await, TickReport::default());
    assert_eq!(
        w.trigger("job-1").await,
        RecoveryOutcome::Skipped { reason: SkipReason::Terminal }
    );
    assert_eq!(w.store.write_count(), writes);
    assert_eq!(w.recovery_events().len(), 2);
}

#[tokio::test]
async fn racing_recoveries_transition_once() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));

    let (a, b) = tokio::join!(w.trigger("job-1"), w.trigger("job-1"));

    let paused = [&a, &b].iter().filter(|o| matches!(o, RecoveryOutcome::Paused { .. })).count();
    let skipped = [&a, &b].iter().filter(|o| matches!(o, RecoveryOutcome::Skipped { .. })).count();
    assert_eq!((paused, skipped), (1, 1));
    assert_eq!(w.store.write_count(), 1);
    assert_eq!(w.attempts("job-1"), Some(1));
    assert_eq!(w.recovery_events().len(), 1);
}

#[tokio::test]
async fn repeated_triggers_without_resume_pause_once() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        outcomes.push(w.trigger("job-1").await);
        w.store.clock().advance(Duration::from_secs(6));
    }

    assert_eq!(outcomes[0], RecoveryOutcome::Paused { attempts: 1 });
    assert!(outcomes[1..]
        .iter()
        .all(|o| *o == RecoveryOutcome::Skipped { reason: SkipReason::AlreadyPaused }));
    assert_eq!(w.state("job-1"), JobState::Paused);
    assert_eq!(w.attempts("job-1"), Some(1));
    assert_eq!(w.recovery_events().len(), 1);
}

#[tokio::test]
async fn back_to_back_stall_within_backoff_is_deferred() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.tick().await;
    w.resume("job-1");

    // Stall again without letting the backoff window pass on the clock.
    w.store.insert({
        let mut job = w.store.get("job-1").unwrap();
        job.last_heartbeat_at_ms = 0;
        job
    });
    let report = w.tick().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(w.state("job-1"), JobState::Running);
    assert_eq!(w.attempts("job-1"), Some(1));
}
