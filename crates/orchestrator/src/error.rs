// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `OrchestratorError` — errors the run state machine itself can raise,
//! plus `From` impls lifting every collaborator's typed error into it.

use campers_compute::ComputeError;
use campers_config::ConfigError;
use campers_playbook::PlaybookError;
use campers_ssh::SshError;
use campers_sync::SyncError;
use campers_tunnel::TunnelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ConfigError),

    #[error("compute provider error: {0}")]
    Provider(#[from] ComputeError),

    #[error(
        "instance '{instance_id}' already exists in region '{found_region}', but this run is configured for '{configured_region}'"
    )]
    RegionMismatch {
        instance_id: String,
        found_region: String,
        configured_region: String,
    },

    #[error("an instance named '{name}' is already running; stop or destroy it before running again")]
    AlreadyRunning { name: String },

    #[error("an instance named '{name}' is currently {state}; retry once it settles")]
    TransientState { name: String, state: String },

    #[error("ssh transport error: {0}")]
    Ssh(#[from] SshError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    #[error("playbook '{name}' failed with exit code {code}")]
    PlaybookFailed { name: String, code: i32 },

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<PlaybookError> for OrchestratorError {
    fn from(err: PlaybookError) -> Self {
        match err {
            PlaybookError::PlaybookFailed { name, code } => {
                OrchestratorError::PlaybookFailed { name, code }
            }
            other => OrchestratorError::Runtime(other.to_string()),
        }
    }
}

impl OrchestratorError {
    /// Process exit code for a non-signal-induced failure, per §7.
    pub fn exit_code(&self) -> i32 {
        match self {
            OrchestratorError::Validation(_) => 2,
            _ => 1,
        }
    }
}
