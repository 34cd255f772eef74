// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybookError {
    #[error("playbook '{name}' failed with exit code {code}")]
    PlaybookFailed { name: String, code: i32 },

    #[error("playbook runner binary not found on PATH")]
    RunnerUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
