// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by a [`crate::ComputeAdapter`] implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("region '{0}' is not a valid/available region")]
    InvalidRegion(String),

    #[error("provider API error ({code}): {message}")]
    ProviderApiError { code: String, message: String },

    #[error("provider credentials are absent or invalid")]
    ProviderCredentialsError,

    #[error("timed out waiting for provider: {0}")]
    ProviderTimeout(String),
}

impl ComputeError {
    /// All three "operational" variants (everything but a config-time
    /// `InvalidRegion`) are non-fatal to cleanup callers: log and continue.
    pub fn is_non_fatal_for_cleanup(&self) -> bool {
        matches!(
            self,
            ComputeError::ProviderApiError { .. }
                | ComputeError::ProviderCredentialsError
                | ComputeError::ProviderTimeout(_)
        )
    }
}
