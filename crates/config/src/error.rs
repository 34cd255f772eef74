// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed validation errors for the config resolver.

use thiserror::Error;

/// Every way a raw config document can fail to become a frozen `RunConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field '{field}'")]
    Missing { field: String },

    #[error("field '{field}' has the wrong type: expected {expected}")]
    WrongType { field: String, expected: String },

    #[error("field '{field}' is out of range: {detail}")]
    OutOfRange { field: String, detail: String },

    #[error("env_filter pattern '{pattern}' does not compile: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("ssh_username '{username}' does not match ^[a-z_][a-z0-9_-]{{0,31}}$")]
    InvalidUsername { username: String },

    #[error("{detail}")]
    ConflictingKeys { detail: String },

    #[error("unknown profile '{name}'{}", available_suffix(.available))]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("playbook reference '{reference}' does not resolve in 'playbooks'")]
    BadPlaybookRef { reference: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " (no profiles are defined)".to_string()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_lists_available_names() {
        let err = ConfigError::UnknownProfile {
            name: "staging".into(),
            available: vec!["dev".into(), "prod".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown profile 'staging' (available: dev, prod)"
        );
    }

    #[test]
    fn unknown_profile_with_no_profiles_gets_distinct_message() {
        let err = ConfigError::UnknownProfile {
            name: "staging".into(),
            available: vec![],
        };
        assert_eq!(
            err.to_string(),
            "unknown profile 'staging' (no profiles are defined)"
        );
    }
}
