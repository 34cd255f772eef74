// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the SSH transport.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SshError {
    #[error("failed to connect to {host}:{port} after exhausting retries: {reason}")]
    ConnectionError {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("command rejected: {0}")]
    InvalidCommand(String),

    #[error("channel error: {0}")]
    ChannelError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
