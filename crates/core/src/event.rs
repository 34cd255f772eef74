// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `RunEvent` — the payload carried on the Event Bus.

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::instance::InstanceDescriptor;

/// High-level phase reported by `status_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Launching,
    Running,
    Stopping,
    Terminating,
    Error,
}

/// Outcome of a single cleanup step, reported by `cleanup_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupStatus {
    InProgress,
    Completed,
    Failed,
}

/// One event on the Event Bus, tagged by `RunEventPayload`'s variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RunEventPayload {
    MergedConfig(RunConfig),
    InstanceDetails(InstanceDescriptor),
    StatusUpdate {
        status: RunStatus,
    },
    MutagenStatus {
        state: String,
        status_text: Option<String>,
        files_synced: Option<u64>,
    },
    CleanupEvent {
        step: String,
        status: CleanupStatus,
    },
    Log(String),
}

/// Thin wrapper pairing a payload with its emission time, so renderers
/// can order and timestamp without re-deriving it from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub emitted_at_ms: u64,
    #[serde(flatten)]
    pub payload: RunEventPayload,
}

impl RunEvent {
    pub fn new(emitted_at_ms: u64, payload: RunEventPayload) -> Self {
        Self {
            emitted_at_ms,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_event_round_trips_through_json() {
        let event = RunEvent::new(42, RunEventPayload::Log("hello".into()));
        let json = serde_json::to_string(&event).expect("serialize");
        let back: RunEvent = serde_json::from_str(&json).expect("deserialize");
        match back.payload {
            RunEventPayload::Log(s) => assert_eq!(s, "hello"),
            other => panic!("unexpected payload: {other:?}"),
        }
        assert_eq!(back.emitted_at_ms, 42);
    }

    #[test]
    fn status_update_carries_status_enum() {
        let event = RunEvent::new(
            0,
            RunEventPayload::StatusUpdate {
                status: RunStatus::Running,
            },
        );
        match event.payload {
            RunEventPayload::StatusUpdate { status } => assert_eq!(status, RunStatus::Running),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
