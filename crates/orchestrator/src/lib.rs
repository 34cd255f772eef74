// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! Run Orchestrator (H1): the state machine that drives a single
//! `campers run` from a validated [`campers_core::RunConfig`] through
//! provisioning, connection, sync, playbooks, setup, tunnels, startup,
//! and command execution, plus the Resource Registry (M1), Cleanup
//! Coordinator (H2), Signal Arbiter (M2), and Event Bus (E1) that make
//! teardown deterministic and signal-safe.

mod cleanup;
mod error;
mod event_bus;
mod orchestrator;
mod ports;
mod registry;
mod signal;

#[cfg(any(test, feature = "test-support"))]
mod fakes;

pub use cleanup::{CleanupCoordinator, CleanupReport, DisposalResult};
pub use error::OrchestratorError;
pub use event_bus::{EventBus, EventBusReceiver, EVENT_BUS_CAPACITY};
pub use orchestrator::{RunOptions, RunOrchestrator, RunOutcome};
pub use ports::{
    PlaybookPort, RealSshConnector, RealTunnelConnector, SshConnector, SshPort, SyncPort, TunnelConnector, TunnelPort,
};
pub use registry::{DisposeFn, ResourceHandle, ResourceRegistry};
pub use signal::{install as install_signal_handlers, set_cleanup_target, clear_cleanup_target, SignalAction, SignalKind};

#[cfg(any(test, feature = "test-support"))]
pub use fakes::{
    fake_key_file, FakePlaybookPort, FakeSshConnector, FakeSshPort, FakeSyncPort, FakeTunnelConnector, FakeTunnelPort,
};
