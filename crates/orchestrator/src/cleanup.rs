// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `CleanupCoordinator` (H2) — fixed reverse-dependency-order teardown.
//!
//! Disposal order is exactly the reverse of registration order (§8
//! property 3). The Run Orchestrator is responsible for registering
//! resources in the order that makes the *reverse* match §4.H2's fixed
//! list (tunnels, sync_session, ssh, instance, compute_provider, key
//! material) — see `campers_orchestrator::run` for where each handle is
//! inserted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use campers_core::{CleanupStatus, Clock, RunEventPayload};
use tracing::{error, info};

use crate::error::OrchestratorError;
use crate::event_bus::EventBus;
use crate::registry::ResourceRegistry;

/// Outcome of one resource's disposal, for the aggregated report.
pub struct DisposalResult {
    pub kind: campers_core::ResourceKind,
    pub label: String,
    pub error: Option<OrchestratorError>,
}

/// Everything a single `cleanup()` invocation learned. A second,
/// concurrent invocation that found cleanup already in progress gets an
/// empty, `already_in_progress = true` report.
#[derive(Default)]
pub struct CleanupReport {
    pub already_in_progress: bool,
    pub disposals: Vec<DisposalResult>,
}

impl CleanupReport {
    /// The first error encountered, if any — the orchestrator propagates
    /// this to the caller per §4.H1's CLEANUP state.
    pub fn first_error(&self) -> Option<&OrchestratorError> {
        self.disposals.iter().find_map(|d| d.error.as_ref())
    }
}

/// Owns the Resource Registry for a single run and the `on_exit` policy
/// baked into each registered instance handle's dispose closure.
pub struct CleanupCoordinator<C: Clock> {
    registry: Arc<ResourceRegistry>,
    events: EventBus<C>,
    cleanup_in_progress: AtomicBool,
}

impl<C: Clock> CleanupCoordinator<C> {
    pub fn new(registry: Arc<ResourceRegistry>, events: EventBus<C>) -> Self {
        Self {
            registry,
            events,
            cleanup_in_progress: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Read the flag without acquiring anything — used by the
    /// Orchestrator between state transitions and by the Signal Arbiter
    /// to decide whether a second SIGINT should escalate.
    pub fn is_in_progress(&self) -> bool {
        self.cleanup_in_progress.load(Ordering::Acquire)
    }

    /// Run teardown in fixed reverse-registration order. A second
    /// entrant (from another thread, or a re-entrant signal) returns
    /// immediately with `already_in_progress = true`; it never drains
    /// the registry, so no handle is ever disposed twice (§8 property 5).
    pub async fn cleanup(&self, signal: Option<i32>) -> CleanupReport {
        if self.cleanup_in_progress.swap(true, Ordering::AcqRel) {
            info!("cleanup already in progress, returning immediately");
            return CleanupReport {
                already_in_progress: true,
                disposals: Vec::new(),
            };
        }

        info!(?signal, "cleanup starting");
        let mut disposals = Vec::new();
        for handle in self.registry.drain().into_iter().rev() {
            let kind = handle.kind;
            let label = handle.label.clone();

            self.events.publish(RunEventPayload::CleanupEvent {
                step: label.clone(),
                status: CleanupStatus::InProgress,
            });

            let result = handle.dispose().await;
            let status = if result.is_ok() {
                CleanupStatus::Completed
            } else {
                CleanupStatus::Failed
            };
            if let Err(ref err) = result {
                error!(step = %label, error = %err, "cleanup step failed, continuing teardown");
            }
            self.events.publish(RunEventPayload::CleanupEvent {
                step: label.clone(),
                status,
            });

            disposals.push(DisposalResult {
                kind,
                label,
                error: result.err(),
            });
        }

        self.cleanup_in_progress.store(false, Ordering::Release);
        info!("cleanup complete");
        CleanupReport {
            already_in_progress: false,
            disposals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campers_core::{FakeClock, ResourceKind};
    use std::sync::Mutex as StdMutex;

    fn recording_dispose(
        log: Arc<StdMutex<Vec<&'static str>>>,
        name: &'static str,
        fail: bool,
    ) -> crate::registry::DisposeFn {
        Box::new(move || {
            Box::pin(async move {
                log.lock().unwrap().push(name);
                if fail {
                    Err(OrchestratorError::Runtime(format!("{name} failed")))
                } else {
                    Ok(())
                }
            })
        })
    }

    fn coordinator() -> (CleanupCoordinator<FakeClock>, Arc<ResourceRegistry>) {
        let registry = Arc::new(ResourceRegistry::new());
        let (events, _rx) = EventBus::with_capacity(FakeClock::new(), 100);
        (CleanupCoordinator::new(registry.clone(), events), registry)
    }

    #[tokio::test]
    async fn disposes_in_exact_reverse_of_registration_order() {
        let (coordinator, registry) = coordinator();
        let log = Arc::new(StdMutex::new(Vec::new()));
        registry.register(ResourceKind::ComputeProvider, "provider", recording_dispose(log.clone(), "provider", false));
        registry.register(ResourceKind::Instance, "instance", recording_dispose(log.clone(), "instance", false));
        registry.register(ResourceKind::Ssh, "ssh", recording_dispose(log.clone(), "ssh", false));

        coordinator.cleanup(None).await;

        assert_eq!(*log.lock().unwrap(), vec!["ssh", "instance", "provider"]);
    }

    #[tokio::test]
    async fn cleanup_completeness_every_handle_disposed_exactly_once_despite_errors() {
        let (coordinator, registry) = coordinator();
        let log = Arc::new(StdMutex::new(Vec::new()));
        registry.register(ResourceKind::Tunnels, "tunnels", recording_dispose(log.clone(), "tunnels", true));
        registry.register(ResourceKind::SyncSession, "sync", recording_dispose(log.clone(), "sync", false));
        registry.register(ResourceKind::Ssh, "ssh", recording_dispose(log.clone(), "ssh", true));

        let report = coordinator.cleanup(None).await;

        assert_eq!(*log.lock().unwrap(), vec!["tunnels", "sync", "ssh"]);
        assert!(registry.is_empty());
        assert_eq!(report.disposals.len(), 3);
        assert_eq!(report.disposals.iter().filter(|d| d.error.is_some()).count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn idempotent_cleanup_second_concurrent_call_returns_immediately() {
        let (coordinator, registry) = coordinator();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let started = Arc::new(tokio::sync::Notify::new());
        let proceed = Arc::new(tokio::sync::Notify::new());
        registry.register(
            ResourceKind::Ssh,
            "ssh",
            Box::new({
                let log = log.clone();
                let started = started.clone();
                let proceed = proceed.clone();
                move || {
                    Box::pin(async move {
                        started.notify_one();
                        proceed.notified().await;
                        log.lock().unwrap().push("ssh");
                        Ok(())
                    })
                }
            }),
        );

        let coordinator = Arc::new(coordinator);
        let task_a = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.cleanup(None).await }
        });

        // Wait until task A is inside its single dispose call (flag is set,
        // registry already drained) before issuing the concurrent call.
        started.notified().await;
        let report_b = coordinator.cleanup(None).await;
        assert!(report_b.already_in_progress);
        assert!(report_b.disposals.is_empty());

        proceed.notify_one();
        let report_a = task_a.await.expect("task a");

        assert_eq!(log.lock().unwrap().len(), 1);
        assert!(!report_a.already_in_progress);
    }

    #[tokio::test]
    async fn in_progress_flag_is_false_before_and_after_cleanup() {
        let (coordinator, _registry) = coordinator();
        assert!(!coordinator.is_in_progress());
        coordinator.cleanup(None).await;
        assert!(!coordinator.is_in_progress());
    }
}
