// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world for spec tests.

pub use jw_adapters::{FakeJobStore, FakeRoomEmitter, StoreCall};
pub use jw_core::test_support::{running_job, running_job_with_checkpoint};
pub use jw_core::{
    Clock, FakeClock, JobId, JobState, RecoveryEvent, RecoveryStatus, REASON_MAX_ATTEMPTS,
    REASON_NO_CHECKPOINT,
};
pub use jw_engine::{
    Notifier, RecoveryOutcome, SkipReason, Supervisor, SupervisorConfig, TickReport,
};
pub use std::sync::Arc;
pub use std::time::Duration;

/// Long enough that background timers never fire during a test.
const IDLE: Duration = Duration::from_secs(3600);

/// Supervisor over a fake store with a recording room emitter attached.
pub struct World {
    pub store: FakeJobStore,
    pub room: FakeRoomEmitter,
    pub supervisor: Supervisor<FakeClock>,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(SupervisorConfig::default())
    }

    /// Background timers are parked; drive ticks with [`World::tick`].
    pub fn with_config(config: SupervisorConfig) -> Self {
        let config = config.poll_interval(IDLE).cleanup_interval(IDLE);
        let store = FakeJobStore::new(FakeClock::new());
        let room = FakeRoomEmitter::new();
        let supervisor =
            Supervisor::new(config, Arc::new(store.clone()), store.clock().clone()).unwrap();
        supervisor.start(Notifier::new().with_room(Arc::new(room.clone())));
        Self { store, room, supervisor }
    }

    pub fn now(&self) -> u64 {
        self.store.clock().epoch_ms()
    }

    /// Let every running job's heartbeat age past the stall threshold.
    pub fn stall(&self) {
        let stalled = self.supervisor.config().stalled;
        self.store.clock().advance(stalled + Duration::from_secs(1));
    }

    /// Worker picks a paused job back up from its checkpoint.
    pub fn resume(&self, id: &str) {
        self.store.memory().resume(&JobId::new(id)).unwrap();
    }

    pub async fn tick(&self) -> TickReport {
        self.supervisor.run_tick().await
    }

    pub async fn trigger(&self, id: &str) -> RecoveryOutcome {
        self.supervisor.trigger_recovery(&JobId::new(id)).await.unwrap()
    }

    pub fn state(&self, id: &str) -> JobState {
        self.store.get(id).unwrap().state
    }

    pub fn attempts(&self, id: &str) -> Option<u32> {
        self.supervisor.status().recovery_attempts.get(id).copied()
    }

    /// `job:recovery` payloads delivered so far, in order.
    pub fn recovery_events(&self) -> Vec<RecoveryEvent> {
        self.room
            .calls()
            .into_iter()
            .filter(|c| c.event == "job:recovery")
            .map(|c| serde_json::from_value(c.payload).unwrap())
            .collect()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.supervisor.stop();
    }
}
