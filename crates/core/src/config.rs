// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `RunConfig` — the frozen, validated configuration for a single run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where to put a provisioned instance once the run is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnExit {
    Stop,
    Terminate,
}

impl Default for OnExit {
    fn default() -> Self {
        OnExit::Stop
    }
}

/// Compute provider backing a run. Only `Aws` is implemented; the enum
/// exists so config files can name a provider explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Aws
    }
}

/// One local↔remote directory pair for bidirectional sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPath {
    pub local: String,
    pub remote: String,
}

/// A single named playbook body, as embedded YAML text.
pub type PlaybookName = String;

/// Resolved, validated configuration for one run. Frozen once
/// [`crate::config::RunConfig`] passes validation: nothing downstream
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub instance_type: String,
    #[serde(default)]
    pub disk_size: u32,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "default_camp_name")]
    pub camp_name: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub setup_script: Option<String>,
    #[serde(default)]
    pub startup_script: Option<String>,
    #[serde(default)]
    pub sync_paths: Vec<SyncPath>,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub include_vcs: bool,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub env_filter: Vec<String>,
    #[serde(default = "default_ssh_username")]
    pub ssh_username: String,
    #[serde(default)]
    pub ssh_allowed_cidr: Option<String>,
    #[serde(default)]
    pub on_exit: OnExit,
    #[serde(default)]
    pub ansible_playbook: Option<String>,
    #[serde(default)]
    pub ansible_playbooks: Option<Vec<String>>,
    #[serde(default)]
    pub playbooks: BTreeMap<PlaybookName, String>,
}

fn default_camp_name() -> String {
    "ad-hoc".to_string()
}

fn default_ssh_username() -> String {
    "ubuntu".to_string()
}

impl RunConfig {
    /// `true` once a setup/startup script or final command means the
    /// orchestrator needs to hold an SSH session open at all.
    pub fn needs_ssh(&self) -> bool {
        self.command.is_some() || self.setup_script.is_some() || self.startup_script.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> RunConfig {
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
    fn needs_ssh_false_when_nothing_to_run() {
        assert!(!minimal().needs_ssh());
    }

    #[test]
    fn needs_ssh_true_with_only_setup_script() {
        let mut cfg = minimal();
        cfg.setup_script = Some("echo hi".into());
        assert!(cfg.needs_ssh());
    }

    #[test]
    fn on_exit_defaults_to_stop() {
        assert_eq!(OnExit::default(), OnExit::Stop);
    }
}
