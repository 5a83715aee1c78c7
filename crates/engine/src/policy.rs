// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery decision for one stalled job.
//!
//! ```text
//! stalled ──► already paused ──────► skipped
//!         ├─► attempts >= max ─────► failed (max recovery attempts exceeded)
//!         ├─► checkpoint present ──► paused (attempts += 1)
//!         └─► no checkpoint ───────► failed (no checkpoint available)
//! ```
//!
//! One attempt is one pause-and-resume cycle. Resuming a paused job is driven
//! by its owner and is not handled here.

use crate::error::RecoveryError;
use crate::notifier::Notifier;
use crate::tracker::AttemptTracker;
use jw_adapters::JobStore;
use jw_core::{Clock, JobId, JobState, RecoveryEvent, REASON_MAX_ATTEMPTS, REASON_NO_CHECKPOINT};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Why a recovery request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Job disappeared between scan and recovery.
    Missing,
    /// Job already completed, failed or was cancelled.
    Terminal,
    /// Job is waiting for its owner to resume it; no attempt is spent.
    AlreadyPaused,
    /// Previous attempt is more recent than the configured backoff.
    Backoff,
    /// Another recovery of the same job is still running.
    InFlight,
}

jw_core::simple_display! {
    SkipReason {
        Missing => "missing",
        Terminal => "terminal",
        AlreadyPaused => "already_paused",
        Backoff => "backoff",
        InFlight => "in_flight",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    Skipped { reason: SkipReason },
    Paused { attempts: u32 },
    Failed { reason: String, attempts: u32 },
}

/// Decides and applies the recovery of stalled jobs.
pub struct RecoveryPolicy<C: Clock> {
    store: Arc<dyn JobStore>,
    tracker: Arc<Mutex<AttemptTracker>>,
    clock: C,
    max_attempts: u32,
    backoff_ms: u64,
    in_flight: Mutex<HashSet<JobId>>,
}

impl<C: Clock> RecoveryPolicy<C> {
    pub fn new(
        store: Arc<dyn JobStore>,
        tracker: Arc<Mutex<AttemptTracker>>,
        clock: C,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            store,
            tracker,
            clock,
            max_attempts,
            backoff_ms: backoff.as_millis() as u64,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Recover one job. Performs at most one store transition, one tracker
    /// mutation and one notification.
    pub async fn recover(
        &self,
        id: &JobId,
        notifier: &Notifier,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        let Some(_claim) = InFlight::claim(&self.in_flight, id) else {
            tracing::debug!(job_id = %id, "recovery already in progress");
            return Ok(RecoveryOutcome::Skipped { reason: SkipReason::InFlight });
        };

        // Re-read: the scan result may be stale by now
        let job = match self.store.get_job(id).await.map_err(RecoveryError::store(id))? {
            Some(job) => job,
            None => {
                tracing::debug!(job_id = %id, "stalled job vanished before recovery");
                return Ok(RecoveryOutcome::Skipped { reason: SkipReason::Missing });
            }
        };
        if job.is_terminal() {
            tracing::debug!(job_id = %id, state = %job.state, "stalled job already terminal");
            return Ok(RecoveryOutcome::Skipped { reason: SkipReason::Terminal });
        }

        if job.state == JobState::Paused {
            tracing::debug!(job_id = %id, "job already paused, awaiting resume");
            return Ok(RecoveryOutcome::Skipped { reason: SkipReason::AlreadyPaused });
        }

        let now = self.clock.epoch_ms();
        let attempts = {
            let tracker = self.tracker.lock();
            if let Some(last) = tracker.last_attempt_at_ms(id) {
                let since_ms = now.saturating_sub(last);
                if since_ms < self.backoff_ms {
                    tracing::debug!(job_id = %id, since_ms, "recovery backoff");
                    return Ok(RecoveryOutcome::Skipped { reason: SkipReason::Backoff });
                }
            }
            tracker.get(id)
        };

        if attempts >= self.max_attempts {
            self.store
                .mark_failed(id, REASON_MAX_ATTEMPTS)
                .await
                .map_err(RecoveryError::store(id))?;
            self.tracker.lock().delete(id);
            tracing::warn!(job_id = %id, attempts, "job failed: max recovery attempts exceeded");
            notifier
                .notify(&RecoveryEvent::failed(
                    job.id,
                    job.user_id,
                    REASON_MAX_ATTEMPTS,
                    attempts,
                    now,
                ))
                .await;
            return Ok(RecoveryOutcome::Failed {
                reason: REASON_MAX_ATTEMPTS.to_string(),
                attempts,
            });
        }

        if job.has_checkpoint() {
            self.store.pause(id).await.map_err(RecoveryError::store(id))?;
            let attempts = self.tracker.lock().increment(id, now);
            tracing::info!(
                job_id = %id,
                attempts,
                max = self.max_attempts,
                "stalled job paused for resume"
            );
            notifier.notify(&RecoveryEvent::paused(job.id, job.user_id, attempts, now)).await;
            Ok(RecoveryOutcome::Paused { attempts })
        } else {
            self.store
                .mark_failed(id, REASON_NO_CHECKPOINT)
                .await
                .map_err(RecoveryError::store(id))?;
            self.tracker.lock().delete(id);
            tracing::warn!(job_id = %id, "job failed: stalled without checkpoint");
            notifier
                .notify(&RecoveryEvent::failed(
                    job.id,
                    job.user_id,
                    REASON_NO_CHECKPOINT,
                    attempts,
                    now,
                ))
                .await;
            Ok(RecoveryOutcome::Failed { reason: REASON_NO_CHECKPOINT.to_string(), attempts })
        }
    }
}

/// Marks a job as being recovered until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<JobId>>,
    id: JobId,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<JobId>>, id: &JobId) -> Option<Self> {
        set.lock().insert(id.clone()).then(|| InFlight { set, id: id.clone() })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
