// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("failed to bind local port {port}: {reason}")]
    BindFailed { port: u16, reason: String },

    #[error("ssh connection for tunneling failed: {0}")]
    ConnectionFailed(String),
}
