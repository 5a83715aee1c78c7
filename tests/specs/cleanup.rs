// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

#[tokio::test]
async fn completed_job_entry_is_removed_in_one_pass() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.tick().await;
    w.resume("job-1");
    w.store.memory().complete(&JobId::new("job-1")).unwrap();
    assert_eq!(w.attempts("job-1"), Some(1));

    assert_eq!(w.supervisor.run_cleanup().await, 1);
    assert_eq!(w.attempts("job-1"), None);
}

#[tokio::test]
async fn failed_outside_recovery_entry_is_removed() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.tick().await;
    w.resume("job-1");

    // Worker reports its own failure.
    w.store.insert({
        let mut job = w.store.get("job-1").unwrap();
        job.state = JobState::Failed;
        job
    });

    assert_eq!(w.supervisor.run_cleanup().await, 1);
    assert!(w.supervisor.status().recovery_attempts.is_empty());
}

#[tokio::test]
async fn live_jobs_keep_their_entries() {
    let w = World::new();
    w.store.insert(running_job_with_checkpoint("job-1", 0));
    w.tick().await;

    assert_eq!(w.supervisor.run_cleanup().await, 0);
    assert_eq!(w.attempts("job-1"), Some(1));
}
