// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jw_adapters::{BroadcastBus, FakeRoomEmitter, LifecyclePublisher};
use jw_core::{JobId, LifecycleEventKind, UserId};
use serde_json::json;
use std::time::Duration;

fn event(kind: LifecycleEventKind) -> LifecycleEvent {
    LifecycleEvent {
        kind,
        job_id: JobId::new("job-1"),
        user_id: UserId::new("usr-7"),
        data: json!({ "progress": 40 }),
        timestamp: 1_000,
    }
}

#[tokio::test]
async fn forward_targets_owner_room() {
    let room = FakeRoomEmitter::new();
    for kind in LifecycleEventKind::ALL {
        RealtimeBridge::forward(&room, &event(kind)).await.unwrap();
    }

    let calls = room.calls();
    assert_eq!(calls.len(), LifecycleEventKind::ALL.len());
    assert!(calls.iter().all(|c| c.room == "user:usr-7"));
    assert_eq!(calls[1].event, "job:started");
    assert_eq!(calls[6].event, "job:failed");
    assert_eq!(calls[0].payload["type"], "JOB_CREATED");
    assert_eq!(calls[0].payload["jobId"], "job-1");
    assert_eq!(calls[0].payload["data"]["progress"], 40);
}

#[tokio::test]
async fn relays_bus_until_cancelled() {
    let bus = BroadcastBus::new();
    let room = FakeRoomEmitter::new();
    let cancel = CancellationToken::new();
    let handle = RealtimeBridge::spawn(bus.subscribe(), Arc::new(room.clone()), cancel.clone());

    bus.publish(event(LifecycleEventKind::JobStarted)).await.unwrap();
    bus.publish(event(LifecycleEventKind::JobCompleted)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let events: Vec<_> = room.calls().into_iter().map(|c| c.event).collect();
    assert_eq!(events, vec!["job:started", "job:completed"]);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn stops_when_bus_closes() {
    let bus = BroadcastBus::new();
    let rx = bus.subscribe();
    drop(bus);

    let room = Arc::new(FakeRoomEmitter::new());
    let handle = RealtimeBridge::spawn(rx, room, CancellationToken::new());
    handle.await.unwrap();
}

#[tokio::test]
async fn room_failure_keeps_relaying() {
    let bus = BroadcastBus::new();
    let room = FakeRoomEmitter::new();
    room.set_failing(true);
    let cancel = CancellationToken::new();
    let handle = RealtimeBridge::spawn(bus.subscribe(), Arc::new(room.clone()), cancel.clone());

    bus.publish(event(LifecycleEventKind::JobPaused)).await.unwrap();
    bus.publish(event(LifecycleEventKind::JobResumed)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(room.calls().len(), 2);
    cancel.cancel();
    handle.await.unwrap();
}
