// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jw-adapters: collaborator contracts for the supervisor and their
//! in-process implementations.

#[cfg(any(test, feature = "test-support"))]
mod fake_store;
mod memory;
mod sink;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub use fake_store::{FakeJobStore, GetGate, StoreCall};
pub use memory::MemoryJobStore;
#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakePublisher, FakeRoomEmitter, RoomCall};
pub use sink::{BroadcastBus, LifecyclePublisher, RoomEmitter, RoomHub, RoomMessage, SinkError};
pub use store::{JobQuery, JobStore, StoreError};
