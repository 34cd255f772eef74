// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `SignalArbiter` (M2) — process-wide SIGINT/SIGTERM handling that
//! routes to the currently-bound `CleanupCoordinator`.
//!
//! Exactly one coordinator is bound at a time via a single process-wide
//! slot (a `Weak` pointer behind a `parking_lot::Mutex`, not an owned
//! `Arc`, so the arbiter never keeps a coordinator alive on its own —
//! installed at entry to the `run` command and cleared on exit, per the
//! design note against static-constructor-installed handlers).

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use campers_core::SystemClock;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::cleanup::CleanupCoordinator;

/// The arbiter only ever binds to the coordinator driving the live CLI
/// process, which always runs on the real clock — `campers-orchestrator`'s
/// own tests exercise `CleanupCoordinator<FakeClock>` directly, bypassing
/// signal installation entirely.
type ProdCleanupCoordinator = CleanupCoordinator<SystemClock>;

/// Escalation window: a second SIGINT arriving within this long of the
/// first, while cleanup is still in progress, aborts immediately.
pub const ESCALATION_WINDOW: Duration = Duration::from_millis(1500);

/// Which OS signal reached the arbiter, and the exit code it maps to
/// when cleanup completes without a further escalation (§7, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Sigint,
    Sigterm,
}

impl SignalKind {
    pub fn exit_code(self) -> i32 {
        match self {
            SignalKind::Sigint => 130,
            SignalKind::Sigterm => 143,
        }
    }

    fn raw_number(self) -> i32 {
        match self {
            SignalKind::Sigint => 2,
            SignalKind::Sigterm => 15,
        }
    }
}

/// What the arbiter should do in response to an observed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Run cleanup (first occurrence, or a kind other than a repeated SIGINT).
    RunCleanup,
    /// Skip cleanup entirely and exit immediately with code 130.
    EscalateAbort,
}

static CURRENT_COORDINATOR: Mutex<Option<Weak<ProdCleanupCoordinator>>> = Mutex::new(None);
static LAST_SIGINT: Mutex<Option<Instant>> = Mutex::new(None);

/// Bind the coordinator the arbiter routes signals to for the duration
/// of one run. Call [`clear_cleanup_target`] when the run ends (success
/// or failure) so a signal arriving afterward has nothing to invoke.
pub fn set_cleanup_target(coordinator: &Arc<ProdCleanupCoordinator>) {
    *CURRENT_COORDINATOR.lock() = Some(Arc::downgrade(coordinator));
}

pub fn clear_cleanup_target() {
    *CURRENT_COORDINATOR.lock() = None;
    *LAST_SIGINT.lock() = None;
}

fn current_target() -> Option<Arc<ProdCleanupCoordinator>> {
    CURRENT_COORDINATOR.lock().as_ref().and_then(Weak::upgrade)
}

/// Pure decision function, exercised directly by unit tests: given the
/// signal kind, whether cleanup is already in progress, and the time
/// since the last SIGINT (if any), decide whether to run cleanup or
/// escalate to an immediate abort.
fn decide(kind: SignalKind, cleanup_in_progress: bool, since_last_sigint: Option<Duration>) -> SignalAction {
    if kind == SignalKind::Sigint && cleanup_in_progress {
        if let Some(elapsed) = since_last_sigint {
            if elapsed < ESCALATION_WINDOW {
                return SignalAction::EscalateAbort;
            }
        }
    }
    SignalAction::RunCleanup
}

/// Install SIGINT/SIGTERM handlers on the current tokio runtime. Spawns
/// a background task that lives until the process exits; returns
/// immediately. Exit codes: 130 for SIGINT, 143 for SIGTERM, unless a
/// second SIGINT escalates (exit 130, no further cleanup attempted).
pub fn install() {
    tokio::spawn(async move {
        let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };

        loop {
            let kind = tokio::select! {
                _ = sigint.recv() => SignalKind::Sigint,
                _ = sigterm.recv() => SignalKind::Sigterm,
            };
            handle_signal(kind).await;
        }
    });
}

async fn handle_signal(kind: SignalKind) {
    let Some(coordinator) = current_target() else {
        warn!(?kind, "signal received with no bound cleanup coordinator");
        return;
    };

    let now = Instant::now();
    let cleanup_in_progress = coordinator.is_in_progress();
    let since_last = if kind == SignalKind::Sigint {
        let mut last = LAST_SIGINT.lock();
        let elapsed = last.map(|prev| now.duration_since(prev));
        *last = Some(now);
        elapsed
    } else {
        None
    };

    match decide(kind, cleanup_in_progress, since_last) {
        SignalAction::EscalateAbort => {
            warn!("second SIGINT within escalation window, aborting without further cleanup");
            std::process::exit(SignalKind::Sigint.exit_code());
        }
        SignalAction::RunCleanup => {
            info!(?kind, raw = kind.raw_number(), "signal received, running cleanup");
            coordinator.cleanup(Some(kind.raw_number())).await;
            std::process::exit(kind.exit_code());
        }
    }
}
