// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-bounded subprocess execution, the shape every effect-running
//! adapter in this workspace shares: spawn, wait with a timeout, capture
//! output, and turn a timeout into an explicit error rather than a hang.

use std::time::Duration;

use tokio::process::Command;

pub const DEFAULT_SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SubprocessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub async fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
    label: &str,
) -> std::io::Result<SubprocessOutput> {
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("{label} did not complete within {timeout:?}"),
            )
        })??;

    Ok(SubprocessOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
