// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jw-core: domain types shared by the jobwarden supervisor and its adapters.

pub mod macros;

pub mod clock;
pub mod id;
pub mod job;
pub mod lifecycle;
pub mod recovery;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{JobId, UserId};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Checkpoint, Job, JobState};
pub use lifecycle::{user_room, LifecycleEvent, LifecycleEventKind};
pub use recovery::{
    RecoveryEvent, RecoveryStatus, REASON_MAX_ATTEMPTS, REASON_NO_CHECKPOINT, REASON_STALLED,
    RECOVERY_ROOM_EVENT,
};
