// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jwd: stalled-job supervision daemon.

mod env;
mod lifecycle;
mod logging;

use lifecycle::{Daemon, DaemonError};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let log_dir = env::log_dir();
    let _log_guard = logging::init(log_dir.as_deref())?;

    let daemon = match Daemon::start(env::supervisor_config()) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "jwd failed to start");
            return Err(e);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutdown requested");
    daemon.shutdown().await;
    Ok(())
}
