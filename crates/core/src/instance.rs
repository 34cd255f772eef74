// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `InstanceDescriptor` — the mutable view of a provisioned compute instance.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::id::InstanceId;

/// Lifecycle state of a compute instance as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    Terminated,
}

/// Mutable snapshot of a single compute instance across the run lifecycle.
///
/// Owned exclusively by the orchestrator; the compute adapter only ever
/// returns fresh copies, never mutates one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub instance_id: InstanceId,
    pub state: InstanceState,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub region: String,
    pub instance_type: String,
    pub launch_time: u64,
    pub key_file: PathBuf,
    pub unique_id: String,
    pub reused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_independent() {
        let a = InstanceDescriptor {
            instance_id: InstanceId::new("i-1"),
            state: InstanceState::Pending,
            public_ip: None,
            private_ip: None,
            region: "us-east-1".into(),
            instance_type: "t3.medium".into(),
            launch_time: 0,
            key_file: PathBuf::from("/tmp/key.pem"),
            unique_id: "abc123".into(),
            reused: false,
        };
        let mut b = a.clone();
        b.state = InstanceState::Running;
        assert_eq!(a.state, InstanceState::Pending);
        assert_eq!(b.state, InstanceState::Running);
    }
}
