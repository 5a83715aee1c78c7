// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;
use jw_adapters::{BroadcastBus, RoomHub};
use jw_engine::RealtimeBridge;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn failed_recovery_reaches_owner_room_twice() {
    let store = FakeJobStore::new(FakeClock::new());
    store.insert(running_job("job-1", 0));
    let rooms = RoomHub::new();
    let bus = BroadcastBus::new();
    let cancel = CancellationToken::new();
    let bridge = RealtimeBridge::spawn(bus.subscribe(), Arc::new(rooms.clone()), cancel.clone());
    let mut inbox = rooms.subscribe("user:usr-test");

    let supervisor = Supervisor::new(
        SupervisorConfig::default().poll_interval(Duration::from_secs(3600)),
        Arc::new(store.clone()),
        store.clock().clone(),
    )
    .unwrap();
    supervisor.start(
        Notifier::new()
            .with_room(Arc::new(rooms.clone()))
            .with_bus(Arc::new(bus.clone())),
    );
    supervisor.run_tick().await;

    let mut events = Vec::new();
    for _ in 0..2 {
        let msg = tokio::time::timeout(Duration::from_secs(1), inbox.recv()).await.unwrap();
        events.push(msg.unwrap().event);
    }
    events.sort();
    assert_eq!(events, vec!["job:failed", "job:recovery"]);

    supervisor.shutdown().await;
    cancel.cancel();
    bridge.await.unwrap();
}
