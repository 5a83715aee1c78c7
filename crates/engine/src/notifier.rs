// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of recovery outcomes to observers.

use jw_adapters::{LifecyclePublisher, RoomEmitter, SinkError};
use jw_core::{user_room, LifecycleEvent, RecoveryEvent, RECOVERY_ROOM_EVENT};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single sink call.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Optional room push channel plus optional lifecycle bus.
///
/// With neither configured, recovery still happens; it is just not observed.
#[derive(Clone, Default)]
pub struct Notifier {
    room: Option<Arc<dyn RoomEmitter>>,
    bus: Option<Arc<dyn LifecyclePublisher>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(mut self, room: Arc<dyn RoomEmitter>) -> Self {
        self.room = Some(room);
        self
    }

    pub fn with_bus(mut self, bus: Arc<dyn LifecyclePublisher>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.room.is_none() && self.bus.is_none()
    }

    /// Push `job:recovery` to the owner's room and publish the lifecycle
    /// event. Failures are logged, never returned.
    pub async fn notify(&self, event: &RecoveryEvent) {
        if let Some(room) = &self.room {
            let target = user_room(&event.user_id);
            let result = match serde_json::to_value(event) {
                Ok(payload) => {
                    deliver(room.emit_to_room(&target, RECOVERY_ROOM_EVENT, payload)).await
                }
                Err(e) => Err(SinkError::SendFailed(e.to_string())),
            };
            if let Err(e) = result {
                tracing::warn!(
                    job_id = %event.job_id,
                    room = %target,
                    error = %e,
                    "recovery room emit failed"
                );
            }
        }

        if let Some(bus) = &self.bus {
            let lifecycle = LifecycleEvent::from_recovery(event);
            let kind = lifecycle.kind;
            if let Err(e) = deliver(bus.publish(lifecycle)).await {
                tracing::warn!(
                    job_id = %event.job_id,
                    %kind,
                    error = %e,
                    "lifecycle publish failed"
                );
            }
        }
    }
}

async fn deliver(
    send: impl std::future::Future<Output = Result<(), SinkError>>,
) -> Result<(), SinkError> {
    tokio::time::timeout(DELIVERY_TIMEOUT, send)
        .await
        .map_err(|_| SinkError::SendFailed("delivery timed out".to_string()))?
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
