// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jw_engine::SupervisorConfig;

/// Build the supervisor config from `JW_*` overrides over the defaults.
pub fn supervisor_config() -> SupervisorConfig {
    supervisor_config_from(|key| std::env::var(key).ok())
}

/// Directory for the daemon log file; stderr only when unset.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("JW_LOG_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

pub(crate) fn supervisor_config_from(get: impl Fn(&str) -> Option<String>) -> SupervisorConfig {
    let mut config = SupervisorConfig::default();
    if let Some(v) = parse::<u64>(&get, "JW_STALLED_MS") {
        config.stalled = Duration::from_millis(v);
    }
    if let Some(v) = parse::<u64>(&get, "JW_POLL_INTERVAL_MS") {
        config.poll_interval = Duration::from_millis(v);
    }
    if let Some(v) = parse::<u32>(&get, "JW_MAX_RECOVERY_ATTEMPTS") {
        config.max_recovery_attempts = v;
    }
    if let Some(v) = parse::<u64>(&get, "JW_RECOVERY_BACKOFF_MS") {
        config.recovery_backoff = Duration::from_millis(v);
    }
    if let Some(v) = parse::<usize>(&get, "JW_CLEANUP_BATCH_SIZE") {
        config.cleanup_batch_size = v;
    }
    if let Some(v) = parse::<u64>(&get, "JW_CLEANUP_INTERVAL_MS") {
        config.cleanup_interval = Duration::from_millis(v);
    }
    config
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(%key, value = %raw, "ignoring unparsable override, using default");
            None
        }
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
