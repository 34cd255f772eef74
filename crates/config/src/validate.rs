// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Invariant checks applied to a merged `RunConfig` before it is frozen.

use std::collections::HashSet;

use campers_core::RunConfig;
use regex::Regex;

use crate::error::ConfigError;

const USERNAME_PATTERN: &str = r"^[a-z_][a-z0-9_-]{0,31}$";

/// Enforce every invariant named in §3. Returns the first violation found.
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    if config.region.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "region".into(),
        });
    }
    if config.instance_type.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "instance_type".into(),
        });
    }
    if config.disk_size < 1 {
        return Err(ConfigError::OutOfRange {
            field: "disk_size".into(),
            detail: "must be >= 1".into(),
        });
    }

    let startup_nonempty = config
        .startup_script
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    if startup_nonempty && config.sync_paths.is_empty() {
        return Err(ConfigError::ConflictingKeys {
            detail: "startup_script requires at least one sync_paths entry".into(),
        });
    }

    if config.ansible_playbook.is_some() && config.ansible_playbooks.is_some() {
        return Err(ConfigError::ConflictingKeys {
            detail: "ansible_playbook and ansible_playbooks are mutually exclusive".into(),
        });
    }

    for reference in referenced_playbooks(config) {
        if !config.playbooks.contains_key(&reference) {
            return Err(ConfigError::BadPlaybookRef { reference });
        }
    }

    for pattern in &config.env_filter {
        if let Err(err) = Regex::new(pattern) {
            return Err(ConfigError::InvalidRegex {
                pattern: pattern.clone(),
                reason: err.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    for &port in &config.ports {
        if port == 0 {
            return Err(ConfigError::OutOfRange {
                field: "ports".into(),
                detail: format!("{port} is out of range [1,65535]"),
            });
        }
        if !seen.insert(port) {
            return Err(ConfigError::ConflictingKeys {
                detail: format!("duplicate port {port}"),
            });
        }
    }

    // unwrap is safe: USERNAME_PATTERN is a compile-time constant, verified by tests.
    #[allow(clippy::unwrap_used)]
    let username_regex = Regex::new(USERNAME_PATTERN).unwrap();
    if !username_regex.is_match(&config.ssh_username) {
        return Err(ConfigError::InvalidUsername {
            username: config.ssh_username.clone(),
        });
    }

    Ok(())
}

fn referenced_playbooks(config: &RunConfig) -> Vec<String> {
    let mut refs = Vec::new();
    if let Some(name) = &config.ansible_playbook {
        refs.push(name.clone());
    }
    if let Some(names) = &config.ansible_playbooks {
        refs.extend(names.iter().cloned());
    }
    refs
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use campers_core::{OnExit, Provider};

    use super::*;

    fn base() -> RunConfig {
        RunConfig {
            region: "us-east-1".into(),
            instance_type: "t3.medium".into(),
            disk_size: 50,
            provider: Provider::Aws,
            camp_name: "ad-hoc".into(),
            command: None,
            setup_script: None,
            startup_script: None,
            sync_paths: vec![],
            ports: vec![],
            include_vcs: false,
            ignore: vec![],
            env_filter: vec![],
            ssh_username: "ubuntu".into(),
            ssh_allowed_cidr: None,
            on_exit: OnExit::Stop,
            ansible_playbook: None,
            ansible_playbooks: None,
            playbooks: BTreeMap::new(),
        }
    }

    #[test]
    fn minimal_config_passes() {
        assert!(validate(&base()).is_ok());
    }

    #[test]
    fn startup_script_without_sync_paths_fails() {
        let mut cfg = base();
        cfg.startup_script = Some("echo hi".into());
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingKeys { .. }));
    }

    #[test]
    fn both_ansible_fields_set_is_rejected() {
        let mut cfg = base();
        cfg.ansible_playbook = Some("setup".into());
        cfg.ansible_playbooks = Some(vec!["setup".into()]);
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingKeys { .. }));
    }

    #[test]
    fn unresolved_playbook_reference_fails() {
        let mut cfg = base();
        cfg.ansible_playbook = Some("missing".into());
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::BadPlaybookRef { .. }));
    }

    #[test]
    fn invalid_regex_in_env_filter_fails() {
        let mut cfg = base();
        cfg.env_filter = vec!["[unclosed".into()];
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn duplicate_ports_fail() {
        let mut cfg = base();
        cfg.ports = vec![8080, 8080];
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingKeys { .. }));
    }

    #[test]
    fn bad_ssh_username_fails() {
        let mut cfg = base();
        cfg.ssh_username = "Root".into();
        let err = validate(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUsername { .. }));
    }
}
