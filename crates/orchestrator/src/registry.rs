// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ResourceRegistry` (M1) — insertion-ordered map of live resources,
//! guarded by a lock, consumed only by the Cleanup Coordinator.

use std::future::Future;
use std::pin::Pin;

use campers_core::ResourceKind;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::OrchestratorError;

/// A dispose callback, boxed so the registry can hold heterogeneous
/// resource kinds behind one type. Consumes `self` (`FnOnce`) since a
/// resource is disposed at most once.
pub type DisposeFn =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), OrchestratorError>> + Send>> + Send>;

/// One entry in the registry: what it is, a label for logging/events,
/// and the callback that releases it.
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub label: String,
    dispose: DisposeFn,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, label: impl Into<String>, dispose: DisposeFn) -> Self {
        Self {
            kind,
            label: label.into(),
            dispose,
        }
    }

    /// Invoke the dispose callback, consuming the handle.
    pub async fn dispose(self) -> Result<(), OrchestratorError> {
        (self.dispose)().await
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish()
    }
}

/// Thread-safe, insertion-ordered registry of resources acquired by a
/// single run. A resource is registered only once its underlying
/// resource is observably usable (the Orchestrator's job); it is
/// unregistered only by [`crate::cleanup::CleanupCoordinator::cleanup`]
/// draining it.
#[derive(Default)]
pub struct ResourceRegistry {
    entries: Mutex<IndexMap<ResourceKind, ResourceHandle>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource. A later registration of the same `kind`
    /// supersedes an earlier one (the earlier handle is dropped without
    /// its dispose callback ever running — the caller is responsible for
    /// not orphaning a resource this way).
    pub fn register(&self, kind: ResourceKind, label: impl Into<String>, dispose: DisposeFn) {
        let handle = ResourceHandle::new(kind, label, dispose);
        self.entries.lock().insert(kind, handle);
    }

    /// Atomically snapshot and clear the registry, returning entries in
    /// insertion order. Calling `drain` twice in a row returns an empty
    /// list the second time — the basis of cleanup idempotency.
    pub fn drain(&self) -> Vec<ResourceHandle> {
        std::mem::take(&mut *self.entries.lock())
            .into_values()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn noop_dispose() -> DisposeFn {
        Box::new(|| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn register_and_drain_preserve_insertion_order() {
        let registry = ResourceRegistry::new();
        registry.register(ResourceKind::ComputeProvider, "provider", noop_dispose());
        registry.register(ResourceKind::Instance, "instance", noop_dispose());
        registry.register(ResourceKind::Ssh, "ssh", noop_dispose());

        let drained = registry.drain();
        let kinds: Vec<ResourceKind> = drained.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![ResourceKind::ComputeProvider, ResourceKind::Instance, ResourceKind::Ssh]
        );
    }

    #[test]
    fn duplicate_kind_overwrites_earlier_entry() {
        let registry = ResourceRegistry::new();
        registry.register(ResourceKind::Instance, "first", noop_dispose());
        registry.register(ResourceKind::Instance, "second", noop_dispose());

        let drained = registry.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].label, "second");
    }

    #[test]
    fn drain_is_atomic_and_clears_the_registry() {
        let registry = ResourceRegistry::new();
        registry.register(ResourceKind::Ssh, "ssh", noop_dispose());
        assert_eq!(registry.drain().len(), 1);
        assert!(registry.is_empty());
        assert_eq!(registry.drain().len(), 0);
    }

    #[tokio::test]
    async fn dispose_callback_runs_exactly_once_per_handle() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = ResourceRegistry::new();
        let counter_clone = counter.clone();
        registry.register(
            ResourceKind::Tunnels,
            "tunnels",
            Box::new(move || {
                let counter = counter_clone.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            }),
        );

        for handle in registry.drain() {
            handle.dispose().await.expect("dispose");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
