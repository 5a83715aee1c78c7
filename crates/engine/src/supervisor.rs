// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor lifecycle: periodic scan, periodic tracker cleanup, manual hooks.

use crate::config::SupervisorConfig;
use crate::error::{ConfigError, RecoveryError};
use crate::notifier::Notifier;
use crate::policy::{RecoveryOutcome, RecoveryPolicy};
use crate::scanner::Scanner;
use crate::tracker::AttemptTracker;
use futures_util::future::join_all;
use jw_adapters::{JobQuery, JobStore};
use jw_core::{Clock, JobId, JobState};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Read-only diagnostic snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorStatus {
    pub running: bool,
    pub stalled_threshold_ms: u64,
    pub recovery_attempts: BTreeMap<JobId, u32>,
    /// Milliseconds until the next scan; `None` while stopped.
    pub next_check_ms: Option<u64>,
}

/// Tally of one scan tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub stale: usize,
    pub paused: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Which periodic task a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Scan,
    Cleanup,
}

jw_core::simple_display! {
    TimerKind {
        Scan => "scan",
        Cleanup => "cleanup",
    }
}

struct Timers {
    cancel: CancellationToken,
    scan: JoinHandle<()>,
    cleanup: JoinHandle<()>,
}

struct Shared<C: Clock> {
    config: SupervisorConfig,
    store: Arc<dyn JobStore>,
    scanner: Scanner,
    policy: RecoveryPolicy<C>,
    tracker: Arc<Mutex<AttemptTracker>>,
    notifier: RwLock<Arc<Notifier>>,
    timers: Mutex<Option<Timers>>,
    next_scan_at: Mutex<Option<Instant>>,
}

/// Watches for stalled jobs and drives them through recovery.
///
/// Cheap to clone; clones share one attempt tracker and one set of timers.
/// Timers run on the ambient tokio runtime, so `start` must be called from
/// within one.
pub struct Supervisor<C: Clock> {
    shared: Arc<Shared<C>>,
}

impl<C: Clock> Clone for Supervisor<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<C: Clock> Supervisor<C> {
    pub fn new(
        config: SupervisorConfig,
        store: Arc<dyn JobStore>,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let tracker = Arc::new(Mutex::new(AttemptTracker::new()));
        let policy = RecoveryPolicy::new(
            Arc::clone(&store),
            Arc::clone(&tracker),
            clock,
            config.max_recovery_attempts,
            config.recovery_backoff,
        );
        let scanner = Scanner::new(Arc::clone(&store), config.stalled);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                store,
                scanner,
                policy,
                tracker,
                notifier: RwLock::new(Arc::new(Notifier::new())),
                timers: Mutex::new(None),
                next_scan_at: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.shared.config
    }

    /// Begin periodic scanning and tracker cleanup, delivering outcomes
    /// through `notifier`. Calling this while running only logs a warning.
    pub fn start(&self, notifier: Notifier) {
        let mut timers = self.shared.timers.lock();
        if timers.is_some() {
            warn!("supervisor already running, ignoring start");
            return;
        }
        if notifier.is_empty() {
            warn!("no notification sinks configured, recovery outcomes will not be observed");
        }
        *self.shared.notifier.write() = Arc::new(notifier);

        let cancel = CancellationToken::new();
        let poll = self.shared.config.poll_interval;
        let cleanup_every = self.shared.config.cleanup_interval;
        let now = Instant::now();
        let first_scan = now + poll;
        *self.shared.next_scan_at.lock() = Some(first_scan);

        let scan = spawn_timer(
            Arc::clone(&self.shared),
            TimerKind::Scan,
            first_scan,
            poll,
            cancel.clone(),
            |shared| async move {
                let report = shared.tick().await;
                if report.stale > 0 {
                    info!(?report, "scan tick complete");
                }
            },
        );
        let cleanup = spawn_timer(
            Arc::clone(&self.shared),
            TimerKind::Cleanup,
            now + cleanup_every,
            cleanup_every,
            cancel.clone(),
            |shared| async move {
                let removed = shared.cleanup().await;
                if removed > 0 {
                    info!(removed, "cleaned up recovery attempt entries");
                }
            },
        );
        *timers = Some(Timers { cancel, scan, cleanup });

        info!(
            stalled_ms = self.shared.config.stalled_ms(),
            poll_ms = poll.as_millis() as u64,
            max_attempts = self.shared.config.max_recovery_attempts,
            "supervisor started"
        );
    }

    /// Stop scheduling ticks. A tick already in progress runs to completion.
    pub fn stop(&self) {
        let Some(timers) = self.shared.timers.lock().take() else {
            debug!("supervisor not running, ignoring stop");
            return;
        };
        timers.cancel.cancel();
        *self.shared.next_scan_at.lock() = None;
        info!("supervisor stopped");
    }

    /// Stop, then wait for any in-progress tick and cleanup pass to finish.
    pub async fn shutdown(&self) {
        let timers = self.shared.timers.lock().take();
        let Some(timers) = timers else {
            return;
        };
        timers.cancel.cancel();
        *self.shared.next_scan_at.lock() = None;
        let handles = [(TimerKind::Scan, timers.scan), (TimerKind::Cleanup, timers.cleanup)];
        for (kind, handle) in handles {
            if let Err(e) = handle.await {
                error!(timer = %kind, error = %e, "timer task ended abnormally");
            }
        }
        info!("supervisor shut down");
    }

    pub fn is_running(&self) -> bool {
        self.shared.timers.lock().is_some()
    }

    /// Recover `id` now, skipping the staleness check.
    pub async fn trigger_recovery(&self, id: &JobId) -> Result<RecoveryOutcome, RecoveryError> {
        let notifier = Arc::clone(&self.shared.notifier.read());
        self.shared.policy.recover(id, &notifier).await
    }

    /// Forget recovery attempts for `id`. Returns whether any were recorded.
    pub fn reset_recovery_attempts(&self, id: &JobId) -> bool {
        self.shared.tracker.lock().reset(id)
    }

    pub fn status(&self) -> SupervisorStatus {
        let running = self.is_running();
        let next_check_ms = self.shared.next_scan_at.lock().filter(|_| running).map(|at| {
            at.saturating_duration_since(Instant::now()).as_millis() as u64
        });
        SupervisorStatus {
            running,
            stalled_threshold_ms: self.shared.config.stalled_ms(),
            recovery_attempts: self.shared.tracker.lock().list_all(),
            next_check_ms,
        }
    }

    /// Run one scan-and-recover pass immediately.
    pub async fn run_tick(&self) -> TickReport {
        self.shared.tick().await
    }

    /// Run one tracker cleanup pass immediately. Returns removed entries.
    pub async fn run_cleanup(&self) -> usize {
        self.shared.cleanup().await
    }
}

impl<C: Clock> Shared<C> {
    async fn tick(&self) -> TickReport {
        let stale = self.scanner.scan().await;
        let mut report = TickReport { stale: stale.len(), ..TickReport::default() };
        if stale.is_empty() {
            return report;
        }

        let notifier = Arc::clone(&self.notifier.read());
        let results =
            join_all(stale.iter().map(|job| self.policy.recover(&job.id, &notifier))).await;

        for (job, result) in stale.iter().zip(results) {
            match result {
                Ok(RecoveryOutcome::Paused { .. }) => report.paused += 1,
                Ok(RecoveryOutcome::Failed { .. }) => report.failed += 1,
                Ok(RecoveryOutcome::Skipped { reason }) => {
                    debug!(job_id = %job.id, %reason, "recovery skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    error!(job_id = %job.id, error = %e, "job recovery failed");
                    report.errors += 1;
                }
            }
        }
        report
    }

    async fn cleanup(&self) -> usize {
        let batch = self.config.cleanup_batch_size;
        let mut removed = 0;

        'states: for state in JobState::TERMINAL {
            let mut offset = 0;
            loop {
                if self.tracker.lock().is_empty() {
                    break 'states;
                }
                let page = match self.store.list(JobQuery::new(state, batch).offset(offset)).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(%state, error = %e, "cleanup listing failed");
                        break;
                    }
                };
                {
                    let mut tracker = self.tracker.lock();
                    removed += page.iter().filter(|job| tracker.delete(&job.id)).count();
                }
                if page.len() < batch {
                    break;
                }
                offset += page.len();
            }
        }

        // Entries for jobs that were deleted outright never show up in a listing
        let remaining = self.tracker.lock().ids();
        for id in remaining {
            match self.store.get_job(&id).await {
                Ok(Some(job)) if !job.is_terminal() => {}
                Ok(_) => {
                    if self.tracker.lock().delete(&id) {
                        removed += 1;
                    }
                }
                Err(e) => warn!(job_id = %id, error = %e, "cleanup lookup failed"),
            }
        }
        removed
    }
}

/// Run `body` at `first` and every `period` after until `cancel` fires. Each
/// run executes on its own task so a panic is logged and the timer keeps going.
fn spawn_timer<C, F, Fut>(
    shared: Arc<Shared<C>>,
    kind: TimerKind,
    first: Instant,
    period: Duration,
    cancel: CancellationToken,
    body: F,
) -> JoinHandle<()>
where
    C: Clock,
    F: Fn(Arc<Shared<C>>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let fired_at = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                at = interval.tick() => at,
            };
            if kind == TimerKind::Scan {
                *shared.next_scan_at.lock() = Some(fired_at + period);
            }
            if let Err(e) = tokio::spawn(body(Arc::clone(&shared))).await {
                error!(timer = %kind, error = %e, "timer tick aborted");
            }
        }
        debug!(timer = %kind, "timer stopped");
    })
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
