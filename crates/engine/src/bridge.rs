// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards lifecycle bus traffic into per-user rooms.

use jw_adapters::{RoomEmitter, SinkError};
use jw_core::{user_room, LifecycleEvent};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Relays every [`LifecycleEvent`] to `user:<owner>` under its room event name.
pub struct RealtimeBridge;

impl RealtimeBridge {
    /// Run the relay until `cancel` fires or the bus closes.
    pub fn spawn(
        mut rx: broadcast::Receiver<LifecycleEvent>,
        room: Arc<dyn RoomEmitter>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    received = rx.recv() => received,
                };
                match event {
                    Ok(event) => {
                        if let Err(e) = Self::forward(room.as_ref(), &event).await {
                            tracing::warn!(
                                job_id = %event.job_id,
                                kind = %event.kind,
                                error = %e,
                                "room forward failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "realtime bridge lagged behind lifecycle bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("realtime bridge stopped");
        })
    }

    /// Emit one event to its owner's room.
    pub async fn forward(room: &dyn RoomEmitter, event: &LifecycleEvent) -> Result<(), SinkError> {
        let payload =
            serde_json::to_value(event).map_err(|e| SinkError::SendFailed(e.to_string()))?;
        room.emit_to_room(&user_room(&event.user_id), event.kind.room_event(), payload).await
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
