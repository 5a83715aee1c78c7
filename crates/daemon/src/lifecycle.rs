// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wiring, startup, shutdown.

use std::sync::Arc;

use jw_adapters::{BroadcastBus, MemoryJobStore, RoomHub};
use jw_core::SystemClock;
use jw_engine::{ConfigError, Notifier, RealtimeBridge, Supervisor, SupervisorConfig};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Running daemon: the supervisor plus its realtime tasks.
pub struct Daemon {
    /// Supervised job store. Workers record heartbeats and checkpoints
    /// through this handle; clones share state with the supervisor.
    pub store: MemoryJobStore<SystemClock>,
    pub rooms: RoomHub,
    pub bus: BroadcastBus,
    supervisor: Supervisor<SystemClock>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Daemon {
    /// Validate the config, build the store and sinks, and start supervising.
    pub fn start(config: SupervisorConfig) -> Result<Self, DaemonError> {
        let store = MemoryJobStore::new(SystemClock);
        let rooms = RoomHub::new();
        let bus = BroadcastBus::new();
        let supervisor = Supervisor::new(config, Arc::new(store.clone()), SystemClock)?;
        let cancel = CancellationToken::new();

        let tasks = vec![
            RealtimeBridge::spawn(bus.subscribe(), Arc::new(rooms.clone()), cancel.clone()),
            spawn_event_log(&bus, cancel.clone()),
        ];

        let notifier = Notifier::new()
            .with_room(Arc::new(rooms.clone()))
            .with_bus(Arc::new(bus.clone()));
        supervisor.start(notifier);
        let heartbeat_ms = supervisor.config().heartbeat_interval().as_millis() as u64;
        info!(recommended_heartbeat_ms = heartbeat_ms, "jwd started");

        Ok(Self {
            store,
            rooms,
            bus,
            supervisor,
            cancel,
            tasks,
        })
    }

    /// Stop timers and realtime tasks, waiting for in-flight ticks.
    pub async fn shutdown(self) {
        let tracked = self.supervisor.status().recovery_attempts.len();
        self.supervisor.shutdown().await;
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "daemon task failed during shutdown");
            }
        }
        let pruned = self.rooms.prune();
        info!(tracked, pruned_rooms = pruned, "jwd stopped");
    }
}

fn spawn_event_log(bus: &BroadcastBus, cancel: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => info!(
                        kind = %event.kind,
                        job_id = %event.job_id,
                        user_id = %event.user_id,
                        "lifecycle event"
                    ),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
