// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync daemon binary not found on PATH")]
    SyncUnavailable,

    #[error("sync session creation failed: {stderr}")]
    SyncCreateFailed { stderr: String },

    #[error("sync session '{0}' did not reach steady state before the deadline")]
    SyncTimeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
