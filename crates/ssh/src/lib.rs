// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! SSH Transport (L4): one authenticated SSH session, held for the
//! duration of a run, and the quoting helpers the orchestrator needs to
//! build remote command lines.

mod error;
mod quote;
mod transport;

pub use error::SshError;
pub use quote::{
    build_command_with_env, filter_environment_variables, shell_quote, validate_command,
    wrap_in_dir_shell, wrap_in_home_shell,
};
pub use transport::SshTransport;
