// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

#[tokio::test]
async fn repeated_stalls_pause_until_attempts_run_out() {
    let w = World::with_config(SupervisorConfig::default().max_recovery_attempts(3));
    w.store.insert(running_job_with_checkpoint("job-J1", 0));

    for attempt in 1..=3 {
        if attempt > 1 {
            w.resume("job-J1");
            w.stall();
        }
        let report = w.tick().await;
        assert_eq!(report.paused, 1, "stall {attempt}");
        assert_eq!(w.state("job-J1"), JobState::Paused);
        assert_eq!(w.attempts("job-J1"), Some(attempt));
    }

    w.resume("job-J1");
    w.stall();
    let report = w.tick().await;
    assert_eq!(report.failed, 1);

    let job = w.store.get("job-J1").unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.failure_reason.as_deref(), Some(REASON_MAX_ATTEMPTS));
    assert_eq!(w.attempts("job-J1"), None);

    let outcomes: Vec<_> =
        w.recovery_events().into_iter().map(|e| (e.status, e.attempts)).collect();
    assert_eq!(
        outcomes,
        vec![
            (RecoveryStatus::Paused, 1),
            (RecoveryStatus::Paused, 2),
            (RecoveryStatus::Paused, 3),
            (RecoveryStatus::Failed, 3),
        ]
    );
    assert_eq!(w.recovery_events()[3].reason, REASON_MAX_ATTEMPTS);
}

#[tokio::test]
async fn stall_without_checkpoint_fails_immediately() {
    let w = World::new();
    w.store.insert(running_job("job-J2", 0));

    let report = w.tick().await;

    assert_eq!(report, TickReport { stale: 1, failed: 1, ..TickReport::default() });
    let job = w.store.get("job-J2").unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.failure_reason.as_deref(), Some(REASON_NO_CHECKPOINT));
    assert_eq!(w.attempts("job-J2"), None);

    let events = w.recovery_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, RecoveryStatus::Failed);
    assert_eq!(events[0].reason, REASON_NO_CHECKPOINT);
    assert_eq!(events[0].attempts, 0);
}

#[tokio::test]
async fn job_deleted_after_scan_is_skipped_silently() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-J3", 0));
    w.store.vanish_after_scan("job-J3");

    let report = w.tick().await;

    assert_eq!(report, TickReport { stale: 1, skipped: 1, ..TickReport::default() });
    assert_eq!(w.store.write_count(), 0);
    assert!(w.room.calls().is_empty());
    assert_eq!(w.attempts("job-J3"), None);
}

#[tokio::test(start_paused = true)]
async fn stop_mid_tick_finishes_current_recovery_only() {
    let poll = Duration::from_secs(10);
    let store = FakeJobStore::new(FakeClock::new());
    let supervisor = Supervisor::new(
        SupervisorConfig::default().poll_interval(poll),
        Arc::new(store.clone()),
        store.clock().clone(),
    )
    .unwrap();
    store.insert(running_job_with_checkpoint("job-1", 0));
    let gate = store.gate_gets();

    supervisor.start(Notifier::new());
    gate.entered.notified().await;
    supervisor.stop();
    gate.release(1);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(store.get("job-1").unwrap().state, JobState::Paused);

    store.insert(running_job_with_checkpoint("job-2", 0));
    tokio::time::sleep(poll * 5).await;
    let scans = store
        .calls()
        .iter()
        .filter(|c| matches!(c, StoreCall::FindStale))
        .count();
    assert_eq!(scans, 1);
    assert_eq!(store.get("job-2").unwrap().state, JobState::Running);
}
