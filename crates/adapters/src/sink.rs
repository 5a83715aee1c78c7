// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time notification channels: room-scoped push and a lifecycle bus.

use async_trait::async_trait;
use jw_core::LifecycleEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Per-room and bus channel capacity. Slow subscribers lag rather than block emitters.
const CHANNEL_CAPACITY: usize = 256;

/// Errors from sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink closed")]
    Closed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Push channel that delivers named events to everyone in a room.
#[async_trait]
pub trait RoomEmitter: Send + Sync + 'static {
    async fn emit_to_room(
        &self,
        room: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), SinkError>;
}

/// Pub/sub bus carrying job lifecycle events.
#[async_trait]
pub trait LifecyclePublisher: Send + Sync + 'static {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), SinkError>;
}

/// Message delivered to room subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMessage {
    pub event: String,
    pub payload: serde_json::Value,
}

/// In-process room fan-out using one broadcast channel per room.
#[derive(Clone, Default)]
pub struct RoomHub {
    rooms: Arc<Mutex<HashMap<String, broadcast::Sender<RoomMessage>>>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<RoomMessage> {
        self.rooms
            .lock()
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop rooms nobody is listening to any more.
    pub fn prune(&self) -> usize {
        let mut rooms = self.rooms.lock();
        let before = rooms.len();
        rooms.retain(|_, tx| tx.receiver_count() > 0);
        before - rooms.len()
    }
}

#[async_trait]
impl RoomEmitter for RoomHub {
    async fn emit_to_room(
        &self,
        room: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), SinkError> {
        let tx = self.rooms.lock().get(room).cloned();
        if let Some(tx) = tx {
            // An empty room is not a delivery failure
            let _ = tx.send(RoomMessage { event: event.to_string(), payload });
        } else {
            tracing::trace!(%room, %event, "no subscribers for room");
        }
        Ok(())
    }
}

/// In-process lifecycle bus.
#[derive(Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self { tx: broadcast::channel(CHANNEL_CAPACITY).0 }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecyclePublisher for BroadcastBus {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), SinkError> {
        if self.tx.send(event).is_err() {
            tracing::trace!("lifecycle event dropped: no subscribers");
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{LifecyclePublisher, RoomEmitter, SinkError};
    use async_trait::async_trait;
    use jw_core::LifecycleEvent;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded room emission
    #[derive(Debug, Clone)]
    pub struct RoomCall {
        pub room: String,
        pub event: String,
        pub payload: serde_json::Value,
    }

    #[derive(Default)]
    struct FakeRoomState {
        calls: Vec<RoomCall>,
        fail: bool,
    }

    /// Fake room emitter for testing
    #[derive(Clone, Default)]
    pub struct FakeRoomEmitter {
        inner: Arc<Mutex<FakeRoomState>>,
    }

    impl FakeRoomEmitter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent emit fail (the call is still recorded).
        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        pub fn calls(&self) -> Vec<RoomCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl RoomEmitter for FakeRoomEmitter {
        async fn emit_to_room(
            &self,
            room: &str,
            event: &str,
            payload: serde_json::Value,
        ) -> Result<(), SinkError> {
            let mut inner = self.inner.lock();
            inner.calls.push(RoomCall {
                room: room.to_string(),
                event: event.to_string(),
                payload,
            });
            if inner.fail {
                return Err(SinkError::SendFailed("fake room failure".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePublisherState {
        events: Vec<LifecycleEvent>,
        fail: bool,
    }

    /// Fake lifecycle publisher for testing
    #[derive(Clone, Default)]
    pub struct FakePublisher {
        inner: Arc<Mutex<FakePublisherState>>,
    }

    impl FakePublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        pub fn events(&self) -> Vec<LifecycleEvent> {
            self.inner.lock().events.clone()
        }
    }

    #[async_trait]
    impl LifecyclePublisher for FakePublisher {
        async fn publish(&self, event: LifecycleEvent) -> Result<(), SinkError> {
            let mut inner = self.inner.lock();
            inner.events.push(event);
            if inner.fail {
                return Err(SinkError::Closed);
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePublisher, FakeRoomEmitter, RoomCall};

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
