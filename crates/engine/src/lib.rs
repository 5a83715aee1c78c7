// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jw-engine: stalled-job supervision and checkpoint-based recovery.

mod bridge;
mod config;
mod error;
mod heartbeat;
mod notifier;
mod policy;
mod scanner;
mod supervisor;
mod tracker;

pub use bridge::RealtimeBridge;
pub use config::{
    SupervisorConfig, DEFAULT_CLEANUP_BATCH_SIZE, DEFAULT_CLEANUP_INTERVAL,
    DEFAULT_MAX_RECOVERY_ATTEMPTS, DEFAULT_POLL_INTERVAL, DEFAULT_RECOVERY_BACKOFF,
    DEFAULT_STALLED,
};
pub use error::{ConfigError, RecoveryError};
pub use heartbeat::Heartbeat;
pub use notifier::Notifier;
pub use policy::{RecoveryOutcome, RecoveryPolicy, SkipReason};
pub use scanner::Scanner;
pub use supervisor::{Supervisor, SupervisorStatus, TickReport};
pub use tracker::AttemptTracker;
