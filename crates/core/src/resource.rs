// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ResourceKind` — the tag recorded for every entry in the Resource Registry.
//!
//! The registry itself (insertion order, dispose closures, the mutex) is
//! mechanism rather than data and lives in `campers-orchestrator`, since
//! disposing most resource kinds means awaiting an adapter call. This
//! module only carries the shared vocabulary both crates need to agree on.

use serde::{Deserialize, Serialize};

/// What kind of resource a registry entry disposes of. Ordering here
/// has no significance; disposal order is always insertion order,
/// reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ComputeProvider,
    Instance,
    Ssh,
    SyncSession,
    Tunnels,
    KeyMaterial,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::ComputeProvider => "compute_provider",
            ResourceKind::Instance => "instance",
            ResourceKind::Ssh => "ssh",
            ResourceKind::SyncSession => "sync_session",
            ResourceKind::Tunnels => "tunnels",
            ResourceKind::KeyMaterial => "key_material",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_snake_case_step_name() {
        assert_eq!(ResourceKind::SyncSession.to_string(), "sync_session");
        assert_eq!(ResourceKind::KeyMaterial.to_string(), "key_material");
    }
}
