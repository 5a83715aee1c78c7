// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jw_adapters::StoreError;
use jw_core::JobId;
use thiserror::Error;

/// Errors raised while recovering a single job.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("recovery of {job_id} failed: {source}")]
    Store {
        job_id: JobId,
        #[source]
        source: StoreError,
    },
}

impl RecoveryError {
    pub(crate) fn store(job_id: &JobId) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| RecoveryError::Store { job_id: job_id.clone(), source }
    }
}

/// Invalid supervisor configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("cleanup batch size must be greater than zero")]
    ZeroBatchSize,
}
