// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `SyncController` — subprocess control of the external `mutagen`-
//! compatible file sync daemon.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::subprocess::{run_with_timeout, DEFAULT_SUBPROCESS_TIMEOUT};

const SYNC_BINARY: &str = "mutagen";
const BASE_VCS_IGNORE: &[&str] = &[".git", ".gitignore"];
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_SYNC_DEADLINE: Duration = Duration::from_secs(300);
const STEADY_TOKEN: &str = "watching";

pub struct SyncController {
    poll_interval: Duration,
}

impl SyncController {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Verify the daemon binary is present.
    pub async fn preflight(&self) -> Result<(), SyncError> {
        let mut command = Command::new(SYNC_BINARY);
        command.arg("version");
        match run_with_timeout(command, DEFAULT_SUBPROCESS_TIMEOUT, "mutagen version").await {
            Ok(output) if output.success => Ok(()),
            _ => Err(SyncError::SyncUnavailable),
        }
    }

    /// Terminate a pre-existing session with this name, if any. Ignores errors.
    pub async fn cleanup_orphaned(&self, session_name: &str) {
        let mut command = Command::new(SYNC_BINARY);
        command.args(["sync", "terminate", session_name]);
        let _ = run_with_timeout(command, DEFAULT_SUBPROCESS_TIMEOUT, "mutagen sync terminate").await;
    }

    /// Invokes the daemon's create subcommand over an SSH endpoint that
    /// matches the orchestrator's own key and port.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_session(
        &self,
        name: &str,
        local: &str,
        remote: &str,
        host: &str,
        key_path: &Path,
        user: &str,
        ignore_patterns: &[String],
        include_vcs: bool,
        ssh_port: u16,
    ) -> Result<(), SyncError> {
        let remote_spec = format!("{user}@{host}:{remote}");
        let mut command = Command::new(SYNC_BINARY);
        command.args(["sync", "create", "--name", name, local, &remote_spec]);
        command.args(["--ssh-port", &ssh_port.to_string()]);
        command.args(["--ssh-identity", &key_path.display().to_string()]);

        if !include_vcs {
            for pattern in BASE_VCS_IGNORE {
                command.args(["--ignore", pattern]);
            }
        }
        for pattern in ignore_patterns {
            command.args(["--ignore", pattern]);
        }

        let output = run_with_timeout(command, DEFAULT_SUBPROCESS_TIMEOUT, "mutagen sync create")
            .await
            .map_err(|e| SyncError::SyncCreateFailed {
                stderr: e.to_string(),
            })?;

        if !output.success {
            return Err(SyncError::SyncCreateFailed {
                stderr: output.stderr,
            });
        }

        info!(name, local, remote, "sync session created");
        Ok(())
    }

    /// Returns the daemon's freeform status line for a session.
    pub async fn status(&self, session_name: &str) -> Result<String, SyncError> {
        let mut command = Command::new(SYNC_BINARY);
        command.args(["sync", "list", session_name]);
        let output = run_with_timeout(command, DEFAULT_SUBPROCESS_TIMEOUT, "mutagen sync list").await?;
        Ok(output.stdout)
    }

    /// Polls `status` until it contains `watching`, or the deadline elapses.
    pub async fn wait_steady(&self, session_name: &str, deadline: Option<Duration>) -> Result<(), SyncError> {
        let deadline = deadline.unwrap_or(DEFAULT_SYNC_DEADLINE);
        let mut waited = Duration::ZERO;
        loop {
            let status = self.status(session_name).await.unwrap_or_default();
            if is_steady(&status) {
                return Ok(());
            }
            if waited >= deadline {
                return Err(SyncError::SyncTimeout(session_name.to_string()));
            }
            tokio::time::sleep(self.poll_interval).await;
            waited += self.poll_interval;
        }
    }

    /// Idempotent; swallows daemon errors.
    pub async fn terminate(&self, session_name: &str) {
        let mut command = Command::new(SYNC_BINARY);
        command.args(["sync", "terminate", session_name]);
        if let Err(err) = run_with_timeout(command, DEFAULT_SUBPROCESS_TIMEOUT, "mutagen sync terminate").await {
            warn!(session_name, error = %err, "sync terminate failed, ignoring");
        }
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

/// `mutagen sync list` spells the steady-state token inconsistently
/// across versions (`watching` vs. `Watching for changes`); match it
/// case-insensitively rather than pin an exact spelling.
fn is_steady(status: &str) -> bool {
    status.to_ascii_lowercase().contains(STEADY_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_vcs_ignore_matches_spec() {
        assert_eq!(BASE_VCS_IGNORE, &[".git", ".gitignore"]);
    }

    #[test]
    fn default_deadlines_match_spec() {
        assert_eq!(DEFAULT_POLL_INTERVAL, Duration::from_secs(1));
        assert_eq!(DEFAULT_SYNC_DEADLINE, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn wait_steady_times_out_when_status_never_becomes_watching() {
        let controller = SyncController::with_poll_interval(Duration::from_millis(1));
        // No real daemon is present in this test environment, so `status`
        // always errors and is treated as "not yet steady"; the deadline
        // still fires rather than looping forever.
        let result = controller
            .wait_steady("nonexistent-session", Some(Duration::from_millis(5)))
            .await;
        assert!(matches!(result, Err(SyncError::SyncTimeout(_))));
    }

    #[test]
    fn steady_match_is_case_insensitive() {
        assert!(is_steady("watching for changes"));
        assert!(is_steady("Watching for changes"));
        assert!(is_steady("WATCHING"));
        assert!(!is_steady("scanning"));
    }
}
