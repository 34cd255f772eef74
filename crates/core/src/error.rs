// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `CampersError` — the umbrella error type consumed at the CLI boundary.
//!
//! Every other crate defines its own narrow `thiserror` enum (validation
//! errors, provider errors, transport errors, ...) and provides a `From`
//! impl into this one. `campers-cli` matches on [`CampersError`] once, at
//! the top, to decide the process exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampersError {
    /// Config failed validation before any provider call was made.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// The underlying compute provider failed or its credentials were missing/invalid.
    #[error("compute provider error: {0}")]
    Provider(String),

    /// An instance matching the run's name exists in a region other than the configured one.
    #[error("region mismatch: {0}")]
    RegionMismatch(String),

    /// SSH transport failed to connect or a remote command could not be dispatched.
    #[error("ssh transport error: {0}")]
    Ssh(String),

    /// File sync preflight, session creation, or steady-state wait failed.
    #[error("sync error: {0}")]
    Sync(String),

    /// Port tunnel setup failed.
    #[error("tunnel error: {0}")]
    Tunnel(String),

    /// A playbook exited non-zero.
    #[error("playbook '{name}' failed with exit code {code}")]
    PlaybookFailed { name: String, code: i32 },

    /// A setup or startup script exited non-zero; the run cannot continue.
    #[error("runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playbook_failed_message_includes_name_and_code() {
        let err = CampersError::PlaybookFailed {
            name: "provision".into(),
            code: 2,
        };
        assert_eq!(err.to_string(), "playbook 'provision' failed with exit code 2");
    }
}
