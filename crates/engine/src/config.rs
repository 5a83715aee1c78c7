// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor configuration.

use crate::error::ConfigError;
use std::time::Duration;

/// Heartbeat age after which a running job counts as stalled (30s).
pub const DEFAULT_STALLED: Duration = Duration::from_secs(30);
/// Scan cadence (10s).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 3;
/// Minimum spacing between two recovery attempts of one job (5s).
pub const DEFAULT_RECOVERY_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_CLEANUP_BATCH_SIZE: usize = 100;
/// Attempt-tracker garbage collection cadence (5 minutes).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Process-wide supervisor settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub stalled: Duration,
    pub poll_interval: Duration,
    pub max_recovery_attempts: u32,
    /// Zero disables spacing between attempts.
    pub recovery_backoff: Duration,
    pub cleanup_batch_size: usize,
    pub cleanup_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stalled: DEFAULT_STALLED,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
            recovery_backoff: DEFAULT_RECOVERY_BACKOFF,
            cleanup_batch_size: DEFAULT_CLEANUP_BATCH_SIZE,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl SupervisorConfig {
    jw_core::setters! {
        set {
            stalled: Duration,
            poll_interval: Duration,
            max_recovery_attempts: u32,
            recovery_backoff: Duration,
            cleanup_batch_size: usize,
            cleanup_interval: Duration,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stalled.is_zero() {
            return Err(ConfigError::ZeroDuration("stalled threshold"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll interval"));
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("cleanup interval"));
        }
        if self.cleanup_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    /// Heartbeat cadence workers should use: a third of the stall threshold,
    /// so two consecutive missed beats still leave the job alive.
    pub fn heartbeat_interval(&self) -> Duration {
        self.stalled / 3
    }

    pub fn stalled_ms(&self) -> u64 {
        self.stalled.as_millis() as u64
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
