// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Maps collaborator errors to process exit codes (§7) and attaches a
//! remediation hint for AWS error codes that are worth spelling out.

use campers_compute::ComputeError;
use campers_config::ConfigError;
use campers_orchestrator::OrchestratorError;

use crate::exit_error::ExitError;

/// A well-known AWS API error code the CLI can give concrete advice for,
/// rather than just echoing the SDK's message back at the user.
pub fn remediation_hint(code: &str) -> Option<&'static str> {
    match code {
        "UnauthorizedOperation" => {
            Some("the IAM principal campers is running as lacks a required EC2 permission")
        }
        "InvalidParameterValue" => {
            Some("check --instance-type and --region are a valid combination for your account")
        }
        "InstanceLimitExceeded" => {
            Some("your account's EC2 instance limit in this region has been reached")
        }
        "ExpiredToken" => Some("refresh your AWS credentials and retry"),
        _ => None,
    }
}

fn with_hint(message: String) -> String {
    let Some(code) = message
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(code, _)| code)
    else {
        return message;
    };
    match remediation_hint(code) {
        Some(hint) => format!("{message}\nhint: {hint}"),
        None => message,
    }
}

/// Config errors are always an exit-2 usage error per §7.
pub fn config_exit_error(err: ConfigError) -> ExitError {
    ExitError::new(2, err.to_string())
}

/// Orchestrator errors carry their own exit-code mapping; provider
/// errors get an AWS remediation hint appended when one is known.
pub fn orchestrator_exit_error(err: OrchestratorError) -> ExitError {
    let code = err.exit_code();
    ExitError::new(code, with_hint(err.to_string()))
}

pub fn compute_exit_error(err: ComputeError) -> ExitError {
    ExitError::new(1, with_hint(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_gets_a_hint() {
        assert!(remediation_hint("UnauthorizedOperation").is_some());
    }

    #[test]
    fn unknown_code_has_no_hint() {
        assert!(remediation_hint("SomeNewErrorCode").is_none());
    }

    #[test]
    fn provider_error_message_gets_hint_appended() {
        let err = ComputeError::ProviderApiError {
            code: "ExpiredToken".into(),
            message: "token has expired".into(),
        };
        let exit = compute_exit_error(err);
        assert!(exit.message.contains("hint: refresh your AWS credentials"));
    }
}
